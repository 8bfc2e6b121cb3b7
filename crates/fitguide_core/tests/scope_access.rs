use fitguide_core::{
    run_boundary, use_loading, use_safety, LoadingProvider, ManualClock, ProviderKind,
    SafetyProvider, ScopeContext, ScopeError,
};
use serde_json::json;
use std::sync::Arc;

#[test]
fn accessors_outside_any_provider_fail_every_time() {
    let ctx: ScopeContext = ScopeContext::root();
    for _ in 0..5 {
        assert_eq!(
            use_safety(&ctx).unwrap_err(),
            ScopeError::new(ProviderKind::Safety)
        );
        assert_eq!(
            use_loading(&ctx).unwrap_err(),
            ScopeError::new(ProviderKind::Loading)
        );
    }
}

#[test]
fn safety_scope_does_not_provide_loading() {
    let safety: SafetyProvider = SafetyProvider::new(Arc::new(ManualClock::new(0)));
    let root = ScopeContext::root();

    let result = safety.provide(&root, |ctx| {
        use_safety(ctx)?;
        use_loading(ctx).map(|_| ())
    });
    let err = result.expect_err("loading is not provided");
    assert_eq!(
        err.to_string(),
        "useLoading must be used within a LoadingProvider"
    );
}

#[test]
fn leaving_the_provider_closure_leaves_the_scope() {
    let loading = LoadingProvider::default();
    let root: ScopeContext = ScopeContext::root();

    loading.provide(&root, |ctx| {
        assert!(use_loading(ctx).is_ok());
    });
    assert!(use_loading(&root).is_err());
}

#[test]
fn scope_error_propagates_to_the_fault_boundary() {
    let loading = LoadingProvider::default();
    let root: ScopeContext = ScopeContext::root();

    let outcome = run_boundary("app_root", || {
        loading.provide(&root, |ctx| -> Result<(), ScopeError> {
            use_loading(ctx)?.start_loading("Saving...");
            let store = use_safety(ctx)?;
            store.add_pain_entry(json!({"severity": 3}).as_object().cloned().unwrap());
            Ok(())
        })
    });

    let report = outcome.expect_err("missing SafetyProvider must reach the boundary");
    assert_eq!(report.boundary, "app_root");
    assert!(report.message.contains("SafetyProvider"));
}
