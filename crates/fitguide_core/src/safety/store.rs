//! Shared, append-only safety store handle.

use crate::clock::{system_clock, SharedClock};
use crate::model::safety_record::{EmergencyContact, PainEntry, Record};
use log::{debug, warn};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Change notification delivered to safety observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyEvent {
    PainEntryAdded { sequence: u64, recorded_at: i64 },
    EmergencyContactAdded { sequence: u64 },
}

/// Handle returned by [`SafetyStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SafetyObserverId(u64);

type SafetyObserver = Arc<dyn Fn(&SafetyEvent) + Send + Sync>;

struct SafetyLog<P, C> {
    pain_entries: Vec<PainEntry<P>>,
    contacts: Vec<EmergencyContact<C>>,
    observers: Vec<(SafetyObserverId, SafetyObserver)>,
    next_observer_id: u64,
}

impl<P, C> SafetyLog<P, C> {
    fn observers(&self) -> Vec<SafetyObserver> {
        self.observers
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }
}

/// Append-only store of pain entries and emergency contacts.
///
/// Cloning yields another handle to the same store; every consumer inside one
/// session scope sees the same log.
///
/// # Invariants
/// - `pain_entries()` returns entries in call order with `sequence == index`.
/// - A clock that reads earlier than the last entry is clamped to the last
///   entry's `recorded_at`.
/// - Mutators never fail and never panic, even after a poisoned lock.
/// - Observers receive events in the order the appends were applied, even
///   when appends race on several threads.
pub struct SafetyStore<P = Record, C = Record> {
    log: Arc<Mutex<SafetyLog<P, C>>>,
    // Held across append and delivery; always taken before `log`.
    dispatch: Arc<Mutex<()>>,
    clock: SharedClock,
}

impl<P, C> Clone for SafetyStore<P, C> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            dispatch: Arc::clone(&self.dispatch),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, C> Debug for SafetyStore<P, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let log = self.lock();
        f.debug_struct("SafetyStore")
            .field("pain_entries", &log.pain_entries.len())
            .field("emergency_contacts", &log.contacts.len())
            .field("observers", &log.observers.len())
            .finish()
    }
}

impl<P: Clone, C: Clone> SafetyStore<P, C> {
    /// Creates an empty store stamping entries with `clock`.
    pub fn new(clock: SharedClock) -> Self {
        Self {
            log: Arc::new(Mutex::new(SafetyLog {
                pain_entries: Vec::new(),
                contacts: Vec::new(),
                observers: Vec::new(),
                next_observer_id: 0,
            })),
            dispatch: Arc::new(Mutex::new(())),
            clock,
        }
    }

    /// Creates an empty store backed by the host wall clock.
    pub fn with_system_clock() -> Self {
        Self::new(system_clock())
    }

    /// Appends one pain entry stamped with the current time.
    ///
    /// Returns a copy of the stored entry. Observers run after the store lock
    /// is released, so they may read the store, but they must not append to it.
    pub fn add_pain_entry(&self, payload: P) -> PainEntry<P> {
        let _dispatch = self.dispatch();
        let (entry, observers) = {
            let mut log = self.lock();
            let now = self.clock.now_epoch_ms();
            let recorded_at = match log.pain_entries.last() {
                Some(last) if now < last.recorded_at() => {
                    warn!(
                        "event=clock_regression module=safety status=clamped now={} last={}",
                        now,
                        last.recorded_at()
                    );
                    last.recorded_at()
                }
                _ => now,
            };
            let sequence = log.pain_entries.len() as u64;
            let entry = PainEntry::new(sequence, recorded_at, payload);
            log.pain_entries.push(entry.clone());
            (entry, log.observers())
        };

        debug!(
            "event=pain_entry_added module=safety status=ok sequence={} recorded_at={}",
            entry.sequence(),
            entry.recorded_at()
        );
        notify(
            &observers,
            &SafetyEvent::PainEntryAdded {
                sequence: entry.sequence(),
                recorded_at: entry.recorded_at(),
            },
        );
        entry
    }

    /// Appends one emergency contact. Identical contacts are kept as-is.
    pub fn add_emergency_contact(&self, payload: C) -> EmergencyContact<C> {
        let _dispatch = self.dispatch();
        let (contact, observers) = {
            let mut log = self.lock();
            let sequence = log.contacts.len() as u64;
            let contact = EmergencyContact::new(sequence, payload);
            log.contacts.push(contact.clone());
            (contact, log.observers())
        };

        debug!(
            "event=emergency_contact_added module=safety status=ok sequence={}",
            contact.sequence()
        );
        notify(
            &observers,
            &SafetyEvent::EmergencyContactAdded {
                sequence: contact.sequence(),
            },
        );
        contact
    }

    /// Snapshot of the pain log in insertion order.
    pub fn pain_entries(&self) -> Vec<PainEntry<P>> {
        self.lock().pain_entries.clone()
    }

    /// Snapshot of the emergency contacts in insertion order.
    pub fn emergency_contacts(&self) -> Vec<EmergencyContact<C>> {
        self.lock().contacts.clone()
    }

    pub fn latest_pain_entry(&self) -> Option<PainEntry<P>> {
        self.lock().pain_entries.last().cloned()
    }
}

impl<P, C> SafetyStore<P, C> {
    pub fn pain_entry_count(&self) -> usize {
        self.lock().pain_entries.len()
    }

    pub fn emergency_contact_count(&self) -> usize {
        self.lock().contacts.len()
    }

    /// Registers an observer for future appends.
    pub fn subscribe(
        &self,
        observer: impl Fn(&SafetyEvent) + Send + Sync + 'static,
    ) -> SafetyObserverId {
        let mut log = self.lock();
        let id = SafetyObserverId(log.next_observer_id);
        log.next_observer_id += 1;
        log.observers.push((id, Arc::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: SafetyObserverId) -> bool {
        let mut log = self.lock();
        let before = log.observers.len();
        log.observers.retain(|(existing, _)| *existing != id);
        log.observers.len() != before
    }

    /// Returns whether two handles point at the same store.
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.log, &other.log)
    }

    fn dispatch(&self) -> MutexGuard<'_, ()> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, SafetyLog<P, C>> {
        // Critical sections only push or clone, so a poisoned log is still consistent.
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn notify(observers: &[SafetyObserver], event: &SafetyEvent) {
    for observer in observers {
        observer(event);
    }
}

#[cfg(test)]
mod tests {
    use super::{SafetyEvent, SafetyStore};
    use crate::clock::ManualClock;
    use std::sync::{Arc, Mutex};

    fn store_at(start_ms: i64) -> (SafetyStore<u8, &'static str>, ManualClock) {
        let clock = ManualClock::new(start_ms);
        (SafetyStore::new(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn pain_entries_keep_call_order_and_sequence() {
        let (store, clock) = store_at(1_000);
        for severity in [5, 2, 9] {
            store.add_pain_entry(severity);
            clock.advance(10);
        }

        let entries = store.pain_entries();
        let severities: Vec<u8> = entries.iter().map(|entry| *entry.payload()).collect();
        assert_eq!(severities, vec![5, 2, 9]);
        let sequences: Vec<u64> = entries.iter().map(|entry| entry.sequence()).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
        let stamps: Vec<i64> = entries.iter().map(|entry| entry.recorded_at()).collect();
        assert_eq!(stamps, vec![1_000, 1_010, 1_020]);
    }

    #[test]
    fn backwards_clock_is_clamped_to_last_entry() {
        let (store, clock) = store_at(5_000);
        store.add_pain_entry(1);
        clock.set(4_000);
        let clamped = store.add_pain_entry(2);
        assert_eq!(clamped.recorded_at(), 5_000);

        clock.set(6_000);
        assert_eq!(store.add_pain_entry(3).recorded_at(), 6_000);
    }

    #[test]
    fn observers_run_after_lock_release_and_can_read() {
        let (store, _clock) = store_at(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let reader = store.clone();
        let sink = Arc::clone(&seen);
        store.subscribe(move |event| {
            sink.lock()
                .unwrap()
                .push((*event, reader.pain_entry_count()));
        });

        store.add_pain_entry(4);
        store.add_emergency_contact("coach");

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (
                    SafetyEvent::PainEntryAdded {
                        sequence: 0,
                        recorded_at: 0
                    },
                    1
                ),
                (SafetyEvent::EmergencyContactAdded { sequence: 0 }, 1),
            ]
        );
    }

    #[test]
    fn unsubscribe_is_reported_once() {
        let (store, _clock) = store_at(0);
        let id = store.subscribe(|_| {});
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn clones_share_one_log() {
        let (store, _clock) = store_at(0);
        let other = store.clone();
        other.add_emergency_contact("sister");
        assert_eq!(store.emergency_contact_count(), 1);
        assert!(store.same_store(&other));
        assert!(!store.same_store(&SafetyStore::with_system_clock()));
    }
}
