//! Session safety store.
//!
//! # Responsibility
//! - Keep the append-only pain log and the emergency contact registry for one
//!   session.
//! - Notify observers after every append.
//!
//! # Invariants
//! - Appends are never reordered, mutated, or removed.
//! - `recorded_at` is non-decreasing across the pain log.
//! - Payload contents never reach the log output; only metadata does.

pub mod store;

pub use store::{SafetyEvent, SafetyObserverId, SafetyStore};
