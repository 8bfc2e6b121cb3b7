//! Safety records kept by the session safety store.
//!
//! # Responsibility
//! - Wrap opaque caller payloads with store-assigned ordering metadata.
//!
//! # Invariants
//! - Records are constructed only inside the crate; fields are private and
//!   exposed through getters, so a snapshot cannot be edited into a lie.
//! - Records serialize for the UI bridge but never deserialize: nothing
//!   outside the store may mint an `id`, `sequence`, or `recorded_at`.
//! - `recorded_at` is Unix epoch milliseconds.

use serde::Serialize;
use uuid::Uuid;

/// Schema-less key/value payload used when callers do not bring their own type.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Stable identifier assigned to every pain entry.
pub type PainEntryId = Uuid;

/// One pain-level report, stamped by the store at insertion.
///
/// Entries can be serialized for display but not rebuilt from JSON:
///
/// ```compile_fail
/// let forged: fitguide_core::PainEntry =
///     serde_json::from_str(r#"{"id":"00000000-0000-0000-0000-000000000000"}"#).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PainEntry<P = Record> {
    id: PainEntryId,
    sequence: u64,
    recorded_at: i64,
    payload: P,
}

impl<P> PainEntry<P> {
    pub(crate) fn new(sequence: u64, recorded_at: i64, payload: P) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            recorded_at,
            payload,
        }
    }

    pub fn id(&self) -> PainEntryId {
        self.id
    }

    /// Zero-based position in the pain log.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Insertion time in epoch milliseconds.
    pub fn recorded_at(&self) -> i64 {
        self.recorded_at
    }

    /// Caller payload, carried verbatim.
    pub fn payload(&self) -> &P {
        &self.payload
    }
}

/// One emergency contact, kept in insertion order.
///
/// ```compile_fail
/// let forged: fitguide_core::EmergencyContact =
///     serde_json::from_str(r#"{"sequence":0,"payload":{}}"#).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencyContact<C = Record> {
    sequence: u64,
    payload: C,
}

impl<C> EmergencyContact<C> {
    pub(crate) fn new(sequence: u64, payload: C) -> Self {
        Self { sequence, payload }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn payload(&self) -> &C {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::{EmergencyContact, PainEntry, Record};
    use serde_json::json;

    #[test]
    fn pain_entry_serializes_store_fields_next_to_payload() {
        let mut payload = Record::new();
        payload.insert("severity".to_string(), json!(3));
        let entry = PainEntry::new(0, 1_700_000_000_000, payload);

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["sequence"], json!(0));
        assert_eq!(value["recorded_at"], json!(1_700_000_000_000_i64));
        assert_eq!(value["payload"]["severity"], json!(3));
        assert!(value["id"].is_string());
    }

    #[test]
    fn entries_get_distinct_ids() {
        let first = PainEntry::new(0, 1, ());
        let second = PainEntry::new(1, 1, ());
        assert_ne!(first.id(), second.id());
        assert!(!first.id().is_nil());
    }

    #[test]
    fn contact_keeps_payload_verbatim() {
        let contact = EmergencyContact::new(4, "Dr. Rivera".to_string());
        assert_eq!(contact.sequence(), 4);
        assert_eq!(contact.payload(), "Dr. Rivera");
    }
}
