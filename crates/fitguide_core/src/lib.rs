//! Core state coordination for FitGuide.
//! This crate owns the session safety log and the global busy indicator.

pub mod clock;
pub mod config;
pub mod context;
pub mod fault;
pub mod loading;
pub mod logging;
pub mod model;
pub mod safety;

pub use clock::{system_clock, Clock, ManualClock, SharedClock, SystemClock};
pub use config::{loading_policy_from_env, ConfigError, CoreConfig};
pub use context::{
    use_loading, use_safety, LoadingProvider, ProviderKind, SafetyProvider, ScopeContext,
    ScopeError, Session, SessionId, SessionSummary,
};
pub use fault::{run_boundary, FaultReport};
pub use loading::{LoadingCoordinator, LoadingGuard, LoadingObserverId, LoadingPolicy};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::loading_state::{LoadingState, DEFAULT_LOADING_MESSAGE};
pub use model::safety_record::{EmergencyContact, PainEntry, PainEntryId, Record};
pub use safety::{SafetyEvent, SafetyObserverId, SafetyStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
