//! Session root: one safety store and one loading coordinator per session.
//!
//! # Responsibility
//! - Build both providers over a single clock at session start.
//! - Hand out the root [`ScopeContext`] with both handles installed.
//!
//! # Invariants
//! - Session data lives in memory only and is dropped with the session.

use crate::clock::{system_clock, SharedClock};
use crate::config::CoreConfig;
use crate::context::provider::{LoadingProvider, SafetyProvider};
use crate::context::scope::ScopeContext;
use crate::model::safety_record::Record;
use log::{info, warn};
use uuid::Uuid;

pub type SessionId = Uuid;

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub pain_entries: usize,
    pub emergency_contacts: usize,
    /// The overlay was still busy at teardown.
    pub left_busy: bool,
}

/// One active UI session.
pub struct Session<P = Record, C = Record> {
    id: SessionId,
    started_at: i64,
    safety: SafetyProvider<P, C>,
    loading: LoadingProvider,
    context: ScopeContext<P, C>,
}

impl<P: Clone, C: Clone> Session<P, C> {
    /// Starts a session stamped by the host wall clock.
    pub fn start(config: &CoreConfig) -> Self {
        Self::start_with_clock(config, system_clock())
    }

    /// Starts a session whose safety store reads time from `clock`.
    pub fn start_with_clock(config: &CoreConfig, clock: SharedClock) -> Self {
        let id = Uuid::new_v4();
        let started_at = clock.now_epoch_ms();
        let safety = SafetyProvider::new(clock);
        let loading = LoadingProvider::new(config.loading_policy);
        let context = loading.scope(&safety.scope(&ScopeContext::root()));

        info!(
            "event=session_start module=session status=ok session_id={} loading_policy={}",
            id, config.loading_policy
        );

        Self {
            id,
            started_at,
            safety,
            loading,
            context,
        }
    }
}

impl<P, C> Session<P, C> {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Session start in epoch milliseconds.
    pub fn started_at(&self) -> i64 {
        self.started_at
    }

    /// Root context with both providers installed.
    pub fn context(&self) -> &ScopeContext<P, C> {
        &self.context
    }

    pub fn safety_provider(&self) -> &SafetyProvider<P, C> {
        &self.safety
    }

    pub fn loading_provider(&self) -> &LoadingProvider {
        &self.loading
    }

    /// Runs consumer code inside the session scope.
    pub fn run<R>(&self, consumer: impl FnOnce(&ScopeContext<P, C>) -> R) -> R {
        consumer(&self.context)
    }

    /// Tears the session down, dropping its safety data.
    pub fn end(self) -> SessionSummary {
        let summary = SessionSummary {
            session_id: self.id,
            pain_entries: self.safety.store().pain_entry_count(),
            emergency_contacts: self.safety.store().emergency_contact_count(),
            left_busy: self.loading.coordinator().is_busy(),
        };

        if summary.left_busy {
            warn!(
                "event=session_end module=session status=left_busy session_id={}",
                summary.session_id
            );
        }
        info!(
            "event=session_end module=session status=ok session_id={} pain_entries={} emergency_contacts={}",
            summary.session_id, summary.pain_entries, summary.emergency_contacts
        );
        summary
    }
}
