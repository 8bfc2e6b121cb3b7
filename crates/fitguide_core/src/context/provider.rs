//! Providers that install a handle for a nested tree of consumers.

use crate::clock::SharedClock;
use crate::context::scope::ScopeContext;
use crate::loading::{LoadingCoordinator, LoadingPolicy};
use crate::model::safety_record::Record;
use crate::safety::SafetyStore;

/// Owns one safety store and exposes it to nested consumers.
pub struct SafetyProvider<P = Record, C = Record> {
    store: SafetyStore<P, C>,
}

impl<P: Clone, C: Clone> SafetyProvider<P, C> {
    pub fn new(clock: SharedClock) -> Self {
        Self::from_store(SafetyStore::new(clock))
    }
}

impl<P, C> SafetyProvider<P, C> {
    pub fn from_store(store: SafetyStore<P, C>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SafetyStore<P, C> {
        &self.store
    }

    /// Runs `children` with this provider's store reachable from `parent`.
    pub fn provide<R>(
        &self,
        parent: &ScopeContext<P, C>,
        children: impl FnOnce(&ScopeContext<P, C>) -> R,
    ) -> R {
        children(&self.scope(parent))
    }

    /// Child context of `parent` with this provider's store installed.
    pub fn scope(&self, parent: &ScopeContext<P, C>) -> ScopeContext<P, C> {
        parent.with_safety(self.store.clone())
    }
}

/// Owns one loading coordinator and exposes it to nested consumers.
#[derive(Debug, Clone, Default)]
pub struct LoadingProvider {
    coordinator: LoadingCoordinator,
}

impl LoadingProvider {
    pub fn new(policy: LoadingPolicy) -> Self {
        Self {
            coordinator: LoadingCoordinator::new(policy),
        }
    }

    pub fn coordinator(&self) -> &LoadingCoordinator {
        &self.coordinator
    }

    /// Runs `children` with this provider's coordinator reachable from `parent`.
    pub fn provide<P, C, R>(
        &self,
        parent: &ScopeContext<P, C>,
        children: impl FnOnce(&ScopeContext<P, C>) -> R,
    ) -> R {
        children(&self.scope(parent))
    }

    pub fn scope<P, C>(&self, parent: &ScopeContext<P, C>) -> ScopeContext<P, C> {
        parent.with_loading(self.coordinator.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadingProvider, SafetyProvider};
    use crate::clock::ManualClock;
    use crate::context::scope::{ProviderKind, ScopeContext};
    use crate::loading::LoadingPolicy;
    use std::sync::Arc;

    #[test]
    fn provided_store_is_the_provider_store() {
        let provider: SafetyProvider = SafetyProvider::new(Arc::new(ManualClock::new(0)));
        let root = ScopeContext::root();

        let same = provider.provide(&root, |ctx| {
            ctx.safety()
                .map(|store| store.same_store(provider.store()))
        });
        assert_eq!(same, Ok(true));
        assert!(root.safety().is_err());
    }

    #[test]
    fn inner_provider_shadows_outer() {
        let outer = LoadingProvider::new(LoadingPolicy::LastWriterWins);
        let inner = LoadingProvider::new(LoadingPolicy::Counted);
        let root: ScopeContext = ScopeContext::root();

        let policy = outer.provide(&root, |outer_ctx| {
            inner.provide(outer_ctx, |inner_ctx| {
                inner_ctx.loading().map(|coordinator| coordinator.policy())
            })
        });
        assert_eq!(policy, Ok(LoadingPolicy::Counted));
    }

    #[test]
    fn loading_provider_keeps_parent_safety_handle() {
        let safety: SafetyProvider = SafetyProvider::new(Arc::new(ManualClock::new(0)));
        let loading = LoadingProvider::default();
        let root = ScopeContext::root();

        safety.provide(&root, |safety_ctx| {
            loading.provide(safety_ctx, |ctx| {
                assert!(ctx.provides(ProviderKind::Safety));
                assert!(ctx.provides(ProviderKind::Loading));
            })
        });
    }
}
