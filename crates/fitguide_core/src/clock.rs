//! Time source abstraction for store-assigned timestamps.
//!
//! # Responsibility
//! - Provide epoch-millisecond reads to components that stamp records.
//! - Allow deterministic time in tests without touching the wall clock.
//!
//! # Invariants
//! - Clock reads never panic; a host clock before the Unix epoch reads as `0`.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Shared clock handle passed into stores at construction.
pub type SharedClock = Arc<dyn Clock>;

/// Source of Unix epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_epoch_ms(&self) -> i64;
}

/// Host wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Manually driven clock for deterministic timestamps.
///
/// Clones share the same underlying instant, so a test can keep one clone
/// and advance time seen by a store holding another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_epoch_ms: i64) -> Self {
        Self {
            now_ms: Arc::new(AtomicI64::new(start_epoch_ms)),
        }
    }

    /// Sets the current instant. Moving backwards is allowed.
    pub fn set(&self, epoch_ms: i64) {
        self.now_ms.store(epoch_ms, Ordering::SeqCst);
    }

    /// Advances the current instant by `delta_ms` and returns the new value.
    pub fn advance(&self, delta_ms: i64) -> i64 {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }
}

impl Clock for ManualClock {
    fn now_epoch_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Returns a shared handle to the host wall clock.
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}
