//! Scoped access to the session safety store and loading coordinator.
//!
//! # Responsibility
//! - Carry store/coordinator handles explicitly through consumer code.
//! - Fail loudly with [`ScopeError`] when a consumer runs outside the
//!   provider it depends on.
//!
//! # Invariants
//! - A handle is reachable only inside the closure passed to a provider's
//!   `provide`, or through a [`Session`] root context.
//! - Scope violations are reported every time; nothing is cached or defaulted.

pub mod provider;
pub mod scope;
pub mod session;

pub use provider::{LoadingProvider, SafetyProvider};
pub use scope::{use_loading, use_safety, ProviderKind, ScopeContext, ScopeError};
pub use session::{Session, SessionId, SessionSummary};
