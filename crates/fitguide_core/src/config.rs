//! Runtime configuration for the core.
//!
//! # Responsibility
//! - Collect logging and loading-policy settings in one value.
//! - Read overrides from `FITGUIDE_*` environment variables.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults.
//! - Unknown values are rejected, never silently replaced.

use crate::loading::LoadingPolicy;
use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "FITGUIDE_LOG_LEVEL";
/// Environment variable with an absolute log directory.
pub const ENV_LOG_DIR: &str = "FITGUIDE_LOG_DIR";
/// Environment variable selecting `last_writer_wins` or `counted`.
pub const ENV_LOADING_POLICY: &str = "FITGUIDE_LOADING_POLICY";

/// Core settings resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: &'static str,
    /// Rolling log directory. `None` leaves file logging off.
    pub log_dir: Option<PathBuf>,
    pub loading_policy: LoadingPolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: None,
            loading_policy: LoadingPolicy::default(),
        }
    }
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, one call per variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = normalize_level(&raw).map_err(|_| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = non_blank(lookup(ENV_LOG_DIR)) {
            let path = PathBuf::from(&raw);
            if !path.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_DIR,
                    value: raw,
                });
            }
            config.log_dir = Some(path);
        }
        config.loading_policy = loading_policy_from_lookup(&lookup)?;

        Ok(config)
    }
}

/// Reads only `FITGUIDE_LOADING_POLICY` from the process environment.
///
/// Session setup depends on the policy alone, so a bad logging variable
/// must not stop a session from opening.
pub fn loading_policy_from_env() -> Result<LoadingPolicy, ConfigError> {
    loading_policy_from_lookup(|key| std::env::var(key).ok())
}

/// Reads only the loading policy through `lookup`; unset or blank is the default.
pub fn loading_policy_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<LoadingPolicy, ConfigError> {
    match non_blank(lookup(ENV_LOADING_POLICY)) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: ENV_LOADING_POLICY,
            value: raw.clone(),
        }),
        None => Ok(LoadingPolicy::default()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Configuration resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value for {key}: `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}
