use fitguide_core::{CoreConfig, LoadingState, ManualClock, ScopeError, Session};
use serde_json::json;
use std::sync::Arc;

#[test]
fn saving_a_pain_entry_under_the_busy_overlay() {
    let clock = ManualClock::new(1_700_000_000_000);
    let session: Session =
        Session::start_with_clock(&CoreConfig::default(), Arc::new(clock.clone()));

    let result = session.run(|ctx| -> Result<(), ScopeError> {
        let loading = ctx.loading()?;
        let safety = ctx.safety()?;
        assert_eq!(loading.state(), LoadingState::idle());

        loading.start_loading("Saving…");
        assert_eq!(
            loading.state(),
            LoadingState {
                busy: true,
                message: "Saving…".to_string()
            }
        );

        clock.advance(250);
        let entry = safety.add_pain_entry(json!({"severity": 3}).as_object().cloned().unwrap());
        assert_eq!(safety.pain_entry_count(), 1);
        assert_eq!(entry.recorded_at(), 1_700_000_000_250);

        loading.stop_loading();
        assert_eq!(loading.state(), LoadingState::idle());
        assert_eq!(safety.pain_entries(), vec![entry]);
        Ok(())
    });
    assert_eq!(result, Ok(()));

    let summary = session.end();
    assert_eq!(summary.pain_entries, 1);
    assert!(!summary.left_busy);
}

#[test]
fn separate_sessions_do_not_share_data() {
    let first: Session = Session::start(&CoreConfig::default());
    let second: Session = Session::start(&CoreConfig::default());

    first
        .context()
        .safety()
        .unwrap()
        .add_emergency_contact(json!({"name": "Ana"}).as_object().cloned().unwrap());

    assert_ne!(first.id(), second.id());
    assert_eq!(second.context().safety().unwrap().emergency_contact_count(), 0);
}
