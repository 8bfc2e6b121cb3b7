//! Busy indicator state.
//!
//! # Invariants
//! - `message` is non-empty only while `busy` is true.

use serde::{Deserialize, Serialize};

/// Message used when a caller starts loading without one.
pub const DEFAULT_LOADING_MESSAGE: &str = "Loading...";

/// Snapshot of the global busy indicator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadingState {
    pub busy: bool,
    pub message: String,
}

impl LoadingState {
    /// The `{busy: false, message: ""}` state.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self {
            busy: true,
            message: message.into(),
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.busy
    }
}
