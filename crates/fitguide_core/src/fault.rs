//! Top-level fault boundary for wiring defects.
//!
//! # Responsibility
//! - Turn an error that escaped consumer code into a visible report.
//! - Log the defect once, at the boundary, instead of at each call site.

use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Defect report shown by the UI's error screen.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a fault report must be surfaced to the user"]
pub struct FaultReport {
    pub boundary: String,
    pub message: String,
}

impl Display for FaultReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.boundary, self.message)
    }
}

impl Error for FaultReport {}

/// Runs `consumer` and converts an escaped error into a [`FaultReport`].
pub fn run_boundary<R, E: Error>(
    boundary: &str,
    consumer: impl FnOnce() -> Result<R, E>,
) -> Result<R, FaultReport> {
    consumer().map_err(|err| {
        error!(
            "event=fault_boundary module=fault status=error boundary={} error={}",
            boundary, err
        );
        FaultReport {
            boundary: boundary.to_string(),
            message: err.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::run_boundary;
    use crate::context::{ProviderKind, ScopeError};

    #[test]
    fn passes_through_success() {
        let value = run_boundary("app_root", || Ok::<_, ScopeError>(7));
        assert_eq!(value, Ok(7));
    }

    #[test]
    fn reports_escaped_scope_error() {
        let report = run_boundary("app_root", || {
            Err::<(), _>(ScopeError::new(ProviderKind::Loading))
        })
        .expect_err("scope error should surface");
        assert_eq!(report.boundary, "app_root");
        assert_eq!(
            report.message,
            "useLoading must be used within a LoadingProvider"
        );
        assert_eq!(
            report.to_string(),
            "[app_root] useLoading must be used within a LoadingProvider"
        );
    }
}
