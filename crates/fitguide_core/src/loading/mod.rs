//! Global busy indicator coordination.
//!
//! # Responsibility
//! - Own the single `{busy, message}` signal rendered as a blocking overlay.
//! - Let independent call sites start and stop it.
//!
//! # Invariants
//! - Under [`LoadingPolicy::LastWriterWins`] one stop clears every start.
//! - Under [`LoadingPolicy::Counted`] the indicator stays busy until every
//!   start has a matching stop.
//! - A stop while idle is a no-op, never an error.

pub mod coordinator;

pub use coordinator::{LoadingCoordinator, LoadingGuard, LoadingObserverId, LoadingPolicy};
