//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose session, safety, and loading operations to Dart via FRB.
//! - Act as the app's fault boundary: wiring defects come back as messages.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - At most one session is active per process; calls outside it report the
//!   core scope error text instead of touching any store.
//! - Payloads cross the boundary as JSON object strings.

use fitguide_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    loading_policy_from_env, run_boundary, CoreConfig, EmergencyContact, LoadingPolicy,
    LoadingState, PainEntry, Record, ScopeContext, ScopeError, Session,
};
use log::warn;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ACTIVE_SESSION: Mutex<Option<Session>> = Mutex::new(None);

const FFI_BOUNDARY: &str = "ffi";

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Session lifecycle response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub ok: bool,
    /// Active session ID in string form.
    pub session_id: Option<String>,
    /// Effective loading policy (`last_writer_wins|counted`).
    pub loading_policy: String,
    pub message: String,
}

/// Counters returned when a session closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCloseResponse {
    pub ok: bool,
    pub pain_entries: u64,
    pub emergency_contacts: u64,
    /// Busy overlay was never stopped before close.
    pub left_busy: bool,
    pub message: String,
}

/// Append response envelope for safety records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyAppendResponse {
    pub ok: bool,
    /// Position of the new record in its sequence.
    pub sequence: Option<u64>,
    /// Store-assigned epoch milliseconds; pain entries only.
    pub recorded_at: Option<i64>,
    pub message: String,
}

impl SafetyAppendResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            sequence: None,
            recorded_at: None,
            message: message.into(),
        }
    }
}

/// Snapshot response envelope for safety records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyListResponse {
    pub ok: bool,
    /// One JSON object per record, in insertion order.
    pub items_json: Vec<String>,
    pub message: String,
}

/// Loading indicator response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingResponse {
    pub ok: bool,
    pub busy: bool,
    /// Overlay text; empty when idle.
    pub message: String,
    /// Empty on success, failure text otherwise.
    pub error: String,
}

impl LoadingResponse {
    fn from_state(state: LoadingState) -> Self {
        Self {
            ok: true,
            busy: state.busy,
            message: state.message,
            error: String::new(),
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            busy: false,
            message: String::new(),
            error: error.into(),
        }
    }
}

/// Opens the process session, or returns the one already open.
///
/// Input semantics:
/// - `loading_policy`: `last_writer_wins|counted`; `None` reads
///   `FITGUIDE_LOADING_POLICY` and falls back to `last_writer_wins`.
///   Logging variables are not consulted here.
///
/// # FFI contract
/// - Idempotent while a session is open; the policy of the open session wins.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn session_open(loading_policy: Option<String>) -> SessionResponse {
    let config = match resolve_session_config(loading_policy) {
        Ok(config) => config,
        Err(message) => {
            return SessionResponse {
                ok: false,
                session_id: None,
                loading_policy: String::new(),
                message: format!("session_open failed: {message}"),
            };
        }
    };

    let mut slot = lock_session();
    if let Some(session) = slot.as_ref() {
        return SessionResponse {
            ok: true,
            session_id: Some(session.id().to_string()),
            loading_policy: session
                .loading_provider()
                .coordinator()
                .policy()
                .to_string(),
            message: "Session already open.".to_string(),
        };
    }

    let session: Session = Session::start(&config);
    let response = SessionResponse {
        ok: true,
        session_id: Some(session.id().to_string()),
        loading_policy: config.loading_policy.to_string(),
        message: "Session opened.".to_string(),
    };
    *slot = Some(session);
    response
}

/// Closes the process session and drops its safety data.
///
/// # FFI contract
/// - Returns `ok=false` when no session is open.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn session_close() -> SessionCloseResponse {
    let Some(session) = lock_session().take() else {
        return SessionCloseResponse {
            ok: false,
            pain_entries: 0,
            emergency_contacts: 0,
            left_busy: false,
            message: "session_close failed: no active session".to_string(),
        };
    };

    let summary = session.end();
    SessionCloseResponse {
        ok: true,
        pain_entries: summary.pain_entries as u64,
        emergency_contacts: summary.emergency_contacts as u64,
        left_busy: summary.left_busy,
        message: "Session closed.".to_string(),
    }
}

/// Appends a pain entry to the session log.
///
/// Input semantics:
/// - `payload_json`: JSON object, stored verbatim (e.g. `{"severity":3}`).
///
/// # FFI contract
/// - `recorded_at` in the response is assigned by the core.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn safety_add_pain_entry(payload_json: String) -> SafetyAppendResponse {
    let payload = match parse_record(&payload_json) {
        Ok(payload) => payload,
        Err(message) => {
            return SafetyAppendResponse::failure(format!("safety_add_pain_entry failed: {message}"))
        }
    };

    match in_session(|ctx| Ok(ctx.safety()?.add_pain_entry(payload))) {
        Ok(entry) => SafetyAppendResponse {
            ok: true,
            sequence: Some(entry.sequence()),
            recorded_at: Some(entry.recorded_at()),
            message: "Pain entry recorded.".to_string(),
        },
        Err(message) => {
            SafetyAppendResponse::failure(format!("safety_add_pain_entry failed: {message}"))
        }
    }
}

/// Appends an emergency contact to the session registry.
#[flutter_rust_bridge::frb(sync)]
pub fn safety_add_emergency_contact(payload_json: String) -> SafetyAppendResponse {
    let payload = match parse_record(&payload_json) {
        Ok(payload) => payload,
        Err(message) => {
            return SafetyAppendResponse::failure(format!(
                "safety_add_emergency_contact failed: {message}"
            ))
        }
    };

    match in_session(|ctx| Ok(ctx.safety()?.add_emergency_contact(payload))) {
        Ok(contact) => SafetyAppendResponse {
            ok: true,
            sequence: Some(contact.sequence()),
            recorded_at: None,
            message: "Emergency contact added.".to_string(),
        },
        Err(message) => SafetyAppendResponse::failure(format!(
            "safety_add_emergency_contact failed: {message}"
        )),
    }
}

/// Lists pain entries as JSON objects with `id`, `sequence`, `recorded_at`,
/// and `payload` fields.
#[flutter_rust_bridge::frb(sync)]
pub fn safety_list_pain_entries() -> SafetyListResponse {
    let listed = in_session(|ctx| Ok(ctx.safety()?.pain_entries()))
        .and_then(|entries| to_json_items::<PainEntry>(&entries));
    to_list_response("safety_list_pain_entries", listed)
}

/// Lists emergency contacts as JSON objects with `sequence` and `payload`.
#[flutter_rust_bridge::frb(sync)]
pub fn safety_list_emergency_contacts() -> SafetyListResponse {
    let listed = in_session(|ctx| Ok(ctx.safety()?.emergency_contacts()))
        .and_then(|contacts| to_json_items::<EmergencyContact>(&contacts));
    to_list_response("safety_list_emergency_contacts", listed)
}

/// Shows the busy overlay.
///
/// Input semantics:
/// - `message`: overlay text, stored exactly as given; `None` uses `Loading...`.
#[flutter_rust_bridge::frb(sync)]
pub fn loading_start(message: Option<String>) -> LoadingResponse {
    to_loading_response(in_session(|ctx| {
        let coordinator = ctx.loading()?;
        match message {
            Some(message) => coordinator.start_loading(message),
            None => coordinator.start_loading_default(),
        }
        Ok(coordinator.state())
    }))
}

/// Hides the busy overlay. Stopping while idle succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn loading_stop() -> LoadingResponse {
    to_loading_response(in_session(|ctx| {
        let coordinator = ctx.loading()?;
        coordinator.stop_loading();
        Ok(coordinator.state())
    }))
}

/// Reads the busy overlay state.
#[flutter_rust_bridge::frb(sync)]
pub fn loading_state() -> LoadingResponse {
    to_loading_response(in_session(|ctx| Ok(ctx.loading()?.state())))
}

fn resolve_session_config(loading_policy: Option<String>) -> Result<CoreConfig, String> {
    let loading_policy = match loading_policy {
        Some(raw) => raw.parse::<LoadingPolicy>()?,
        None => loading_policy_from_env().map_err(|err| err.to_string())?,
    };
    Ok(CoreConfig {
        loading_policy,
        ..CoreConfig::default()
    })
}

fn lock_session() -> MutexGuard<'static, Option<Session>> {
    ACTIVE_SESSION
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Runs `consumer` against the active session scope, or against an empty
/// scope when no session is open so the core reports the wiring defect.
fn in_session<T>(
    consumer: impl FnOnce(&ScopeContext) -> Result<T, ScopeError>,
) -> Result<T, String> {
    let slot = lock_session();
    let outcome = match slot.as_ref() {
        Some(session) => run_boundary(FFI_BOUNDARY, || session.run(consumer)),
        None => run_boundary(FFI_BOUNDARY, || consumer(&ScopeContext::root())),
    };
    outcome.map_err(|report| report.message)
}

fn parse_record(payload_json: &str) -> Result<Record, String> {
    match serde_json::from_str::<serde_json::Value>(payload_json) {
        Ok(serde_json::Value::Object(record)) => Ok(record),
        Ok(_) => Err("payload must be a JSON object".to_string()),
        Err(err) => Err(format!("payload is not valid JSON: {err}")),
    }
}

fn to_json_items<T: serde::Serialize>(items: &[T]) -> Result<Vec<String>, String> {
    items
        .iter()
        .map(|item| serde_json::to_string(item).map_err(|err| err.to_string()))
        .collect()
}

fn to_list_response(operation: &str, listed: Result<Vec<String>, String>) -> SafetyListResponse {
    match listed {
        Ok(items_json) => {
            let message = if items_json.is_empty() {
                "No records.".to_string()
            } else {
                format!("Found {} record(s).", items_json.len())
            };
            SafetyListResponse {
                ok: true,
                items_json,
                message,
            }
        }
        Err(message) => {
            warn!("event=ffi_call module=ffi status=error operation={operation}");
            SafetyListResponse {
                ok: false,
                items_json: Vec::new(),
                message: format!("{operation} failed: {message}"),
            }
        }
    }
}

fn to_loading_response(outcome: Result<LoadingState, String>) -> LoadingResponse {
    match outcome {
        Ok(state) => LoadingResponse::from_state(state),
        Err(message) => LoadingResponse::failure(message),
    }
}
