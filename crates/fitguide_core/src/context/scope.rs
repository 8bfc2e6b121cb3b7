//! Scope context and the scope violation error.

use crate::loading::LoadingCoordinator;
use crate::model::safety_record::Record;
use crate::safety::SafetyStore;
use log::error;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Provider a consumer expected to be nested inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Safety,
    Loading,
}

impl ProviderKind {
    pub fn provider_name(self) -> &'static str {
        match self {
            Self::Safety => "SafetyProvider",
            Self::Loading => "LoadingProvider",
        }
    }

    pub fn accessor_name(self) -> &'static str {
        match self {
            Self::Safety => "useSafety",
            Self::Loading => "useLoading",
        }
    }
}

/// Wiring defect: a consumer asked for a handle its scope does not provide.
///
/// Never recover from this locally; propagate it to the top-level fault
/// boundary (see [`crate::fault::run_boundary`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeError {
    pub provider: ProviderKind,
}

impl ScopeError {
    pub fn new(provider: ProviderKind) -> Self {
        Self { provider }
    }
}

impl Display for ScopeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} must be used within a {}",
            self.provider.accessor_name(),
            self.provider.provider_name()
        )
    }
}

impl Error for ScopeError {}

/// Explicit context threaded through consumer code.
///
/// Created empty by [`ScopeContext::root`]; providers derive child contexts
/// with their handle installed. Inner providers shadow outer ones.
pub struct ScopeContext<P = Record, C = Record> {
    safety: Option<SafetyStore<P, C>>,
    loading: Option<LoadingCoordinator>,
}

impl<P, C> Clone for ScopeContext<P, C> {
    fn clone(&self) -> Self {
        Self {
            safety: self.safety.clone(),
            loading: self.loading.clone(),
        }
    }
}

impl<P, C> Default for ScopeContext<P, C> {
    fn default() -> Self {
        Self {
            safety: None,
            loading: None,
        }
    }
}

impl<P, C> Debug for ScopeContext<P, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeContext")
            .field("safety", &self.safety.is_some())
            .field("loading", &self.loading.is_some())
            .finish()
    }
}

impl<P, C> ScopeContext<P, C> {
    /// Context with no provider installed.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns the safety store of the nearest enclosing `SafetyProvider`.
    ///
    /// # Errors
    /// - [`ScopeError`] when no `SafetyProvider` encloses this context.
    pub fn safety(&self) -> Result<SafetyStore<P, C>, ScopeError> {
        self.safety
            .clone()
            .ok_or_else(|| scope_violation(ProviderKind::Safety))
    }

    /// Returns the coordinator of the nearest enclosing `LoadingProvider`.
    ///
    /// # Errors
    /// - [`ScopeError`] when no `LoadingProvider` encloses this context.
    pub fn loading(&self) -> Result<LoadingCoordinator, ScopeError> {
        self.loading
            .clone()
            .ok_or_else(|| scope_violation(ProviderKind::Loading))
    }

    pub fn provides(&self, provider: ProviderKind) -> bool {
        match provider {
            ProviderKind::Safety => self.safety.is_some(),
            ProviderKind::Loading => self.loading.is_some(),
        }
    }

    pub(crate) fn with_safety(&self, store: SafetyStore<P, C>) -> Self {
        Self {
            safety: Some(store),
            loading: self.loading.clone(),
        }
    }

    pub(crate) fn with_loading(&self, coordinator: LoadingCoordinator) -> Self {
        Self {
            safety: self.safety.clone(),
            loading: Some(coordinator),
        }
    }
}

/// Free-function form of [`ScopeContext::safety`].
pub fn use_safety<P, C>(ctx: &ScopeContext<P, C>) -> Result<SafetyStore<P, C>, ScopeError> {
    ctx.safety()
}

/// Free-function form of [`ScopeContext::loading`].
pub fn use_loading<P, C>(ctx: &ScopeContext<P, C>) -> Result<LoadingCoordinator, ScopeError> {
    ctx.loading()
}

fn scope_violation(provider: ProviderKind) -> ScopeError {
    error!(
        "event=scope_violation module=context status=error provider={}",
        provider.provider_name()
    );
    ScopeError::new(provider)
}
