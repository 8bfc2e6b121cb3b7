//! Domain model for session-scoped safety data and UI busy state.
//!
//! # Responsibility
//! - Define the records the safety store appends and hands out as snapshots.
//! - Define the busy/message pair the loading coordinator exposes.
//!
//! # Invariants
//! - Caller payloads are opaque: nothing in this module inspects them.
//! - Store-assigned fields (`sequence`, `recorded_at`, `id`) are read-only
//!   from outside the crate.

pub mod loading_state;
pub mod safety_record;
