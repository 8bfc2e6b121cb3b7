//! Shared loading coordinator handle.

use crate::model::loading_state::{LoadingState, DEFAULT_LOADING_MESSAGE};
use log::debug;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// How overlapping start/stop calls compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingPolicy {
    /// Plain flag: starts overwrite the message, any stop clears the flag.
    ///
    /// An operation finishing early hides the indicator while another
    /// operation is still running.
    #[default]
    LastWriterWins,
    /// Pending counter: busy while more starts than stops have been seen.
    Counted,
}

impl LoadingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastWriterWins => LOADING_POLICY_LAST_WRITER_WINS,
            Self::Counted => LOADING_POLICY_COUNTED,
        }
    }
}

/// Config string for [`LoadingPolicy::LastWriterWins`].
pub const LOADING_POLICY_LAST_WRITER_WINS: &str = "last_writer_wins";
/// Config string for [`LoadingPolicy::Counted`].
pub const LOADING_POLICY_COUNTED: &str = "counted";

impl Display for LoadingPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadingPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            LOADING_POLICY_LAST_WRITER_WINS => Ok(Self::LastWriterWins),
            LOADING_POLICY_COUNTED => Ok(Self::Counted),
            other => Err(format!(
                "unsupported loading policy `{other}`; expected {LOADING_POLICY_LAST_WRITER_WINS}|{LOADING_POLICY_COUNTED}"
            )),
        }
    }
}

/// Handle returned by [`LoadingCoordinator::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadingObserverId(u64);

type LoadingObserver = Arc<dyn Fn(&LoadingState) + Send + Sync>;

struct Indicator {
    state: LoadingState,
    pending: u32,
    observers: Vec<(LoadingObserverId, LoadingObserver)>,
    next_observer_id: u64,
}

/// Shared busy indicator.
///
/// Cloning yields another handle to the same indicator. Observers see state
/// changes in the order they were applied, so the last state an observer
/// received always matches [`LoadingCoordinator::state`] once calls settle.
#[derive(Clone)]
pub struct LoadingCoordinator {
    indicator: Arc<Mutex<Indicator>>,
    // Held across a state change and its delivery; always taken before `indicator`.
    dispatch: Arc<Mutex<()>>,
    policy: LoadingPolicy,
}

impl Debug for LoadingCoordinator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let indicator = self.lock();
        f.debug_struct("LoadingCoordinator")
            .field("policy", &self.policy)
            .field("state", &indicator.state)
            .field("pending", &indicator.pending)
            .finish()
    }
}

impl Default for LoadingCoordinator {
    fn default() -> Self {
        Self::new(LoadingPolicy::default())
    }
}

impl LoadingCoordinator {
    /// Creates an idle coordinator.
    pub fn new(policy: LoadingPolicy) -> Self {
        Self {
            indicator: Arc::new(Mutex::new(Indicator {
                state: LoadingState::idle(),
                pending: 0,
                observers: Vec::new(),
                next_observer_id: 0,
            })),
            dispatch: Arc::new(Mutex::new(())),
            policy,
        }
    }

    pub fn policy(&self) -> LoadingPolicy {
        self.policy
    }

    /// Marks the UI busy with `message`.
    ///
    /// Repeated calls replace the message. Only [`LoadingPolicy::Counted`]
    /// also records another pending operation.
    pub fn start_loading(&self, message: impl Into<String>) {
        let message = message.into();
        let _dispatch = self.dispatch();
        let (state, pending, observers) = {
            let mut indicator = self.lock();
            indicator.pending = match self.policy {
                LoadingPolicy::LastWriterWins => 1,
                LoadingPolicy::Counted => indicator.pending.saturating_add(1),
            };
            indicator.state = LoadingState::busy(message);
            (
                indicator.state.clone(),
                indicator.pending,
                observers_of(&indicator),
            )
        };

        debug!(
            "event=loading_start module=loading status=ok policy={} pending={}",
            self.policy, pending
        );
        notify(&observers, &state);
    }

    /// Same as `start_loading("Loading...")`.
    pub fn start_loading_default(&self) {
        self.start_loading(DEFAULT_LOADING_MESSAGE);
    }

    /// Clears the busy state.
    ///
    /// Under [`LoadingPolicy::LastWriterWins`] this is unconditional. Under
    /// [`LoadingPolicy::Counted`] it releases one pending operation and only
    /// clears the indicator when none remain. Stopping while idle does nothing.
    pub fn stop_loading(&self) {
        let _dispatch = self.dispatch();
        let (state, pending, observers) = {
            let mut indicator = self.lock();
            if indicator.pending == 0 {
                return;
            }
            indicator.pending = match self.policy {
                LoadingPolicy::LastWriterWins => 0,
                LoadingPolicy::Counted => indicator.pending - 1,
            };
            if indicator.pending > 0 {
                debug!(
                    "event=loading_stop module=loading status=still_busy pending={}",
                    indicator.pending
                );
                return;
            }
            indicator.state = LoadingState::idle();
            (
                indicator.state.clone(),
                indicator.pending,
                observers_of(&indicator),
            )
        };

        debug!(
            "event=loading_stop module=loading status=ok policy={} pending={}",
            self.policy, pending
        );
        notify(&observers, &state);
    }

    /// Current `{busy, message}` snapshot.
    pub fn state(&self) -> LoadingState {
        self.lock().state.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().state.busy
    }

    /// Pending starts not yet matched by a stop. At most `1` under
    /// [`LoadingPolicy::LastWriterWins`].
    pub fn pending(&self) -> u32 {
        self.lock().pending
    }

    /// Starts loading and returns a guard that stops it when dropped.
    #[must_use = "dropping the guard immediately stops loading"]
    pub fn track(&self, message: impl Into<String>) -> LoadingGuard {
        self.start_loading(message);
        LoadingGuard {
            coordinator: self.clone(),
            finished: false,
        }
    }

    /// Registers an observer called with the new state on every change.
    ///
    /// Observers may read the coordinator but must not start or stop it.
    pub fn subscribe(
        &self,
        observer: impl Fn(&LoadingState) + Send + Sync + 'static,
    ) -> LoadingObserverId {
        let mut indicator = self.lock();
        let id = LoadingObserverId(indicator.next_observer_id);
        indicator.next_observer_id += 1;
        indicator.observers.push((id, Arc::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: LoadingObserverId) -> bool {
        let mut indicator = self.lock();
        let before = indicator.observers.len();
        indicator.observers.retain(|(existing, _)| *existing != id);
        indicator.observers.len() != before
    }

    /// Returns whether two handles drive the same indicator.
    pub fn same_indicator(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.indicator, &other.indicator)
    }

    fn dispatch(&self) -> MutexGuard<'_, ()> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Indicator> {
        self.indicator.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped loading operation created by [`LoadingCoordinator::track`].
///
/// Dropping the guard calls `stop_loading` once, so an abandoned operation
/// does not leave the overlay stuck.
pub struct LoadingGuard {
    coordinator: LoadingCoordinator,
    finished: bool,
}

impl LoadingGuard {
    /// Stops loading now instead of at drop.
    pub fn finish(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.finished {
            self.finished = true;
            self.coordinator.stop_loading();
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.release();
    }
}

fn observers_of(indicator: &Indicator) -> Vec<LoadingObserver> {
    indicator
        .observers
        .iter()
        .map(|(_, observer)| Arc::clone(observer))
        .collect()
}

fn notify(observers: &[LoadingObserver], state: &LoadingState) {
    for observer in observers {
        observer(state);
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadingCoordinator, LoadingPolicy};
    use crate::model::loading_state::LoadingState;
    use std::sync::{Arc, Mutex};

    #[test]
    fn starts_idle() {
        let coordinator = LoadingCoordinator::default();
        assert_eq!(coordinator.state(), LoadingState::idle());
        assert_eq!(coordinator.policy(), LoadingPolicy::LastWriterWins);
    }

    #[test]
    fn default_message_is_loading() {
        let coordinator = LoadingCoordinator::default();
        coordinator.start_loading_default();
        assert_eq!(coordinator.state(), LoadingState::busy("Loading..."));
    }

    #[test]
    fn last_writer_wins_never_counts_past_one() {
        let coordinator = LoadingCoordinator::new(LoadingPolicy::LastWriterWins);
        coordinator.start_loading("A");
        coordinator.start_loading("B");
        coordinator.start_loading("C");
        assert_eq!(coordinator.pending(), 1);
        coordinator.stop_loading();
        assert_eq!(coordinator.pending(), 0);
        assert!(!coordinator.is_busy());
    }

    #[test]
    fn counted_keeps_latest_message_until_last_stop() {
        let coordinator = LoadingCoordinator::new(LoadingPolicy::Counted);
        coordinator.start_loading("Saving");
        coordinator.start_loading("Syncing");
        coordinator.stop_loading();
        assert_eq!(coordinator.state(), LoadingState::busy("Syncing"));
        coordinator.stop_loading();
        assert_eq!(coordinator.state(), LoadingState::idle());
        coordinator.stop_loading();
        assert_eq!(coordinator.pending(), 0);
    }

    #[test]
    fn observers_skip_redundant_stop() {
        let coordinator = LoadingCoordinator::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        coordinator.subscribe(move |state| sink.lock().unwrap().push(state.clone()));

        coordinator.stop_loading();
        coordinator.start_loading("Uploading");
        coordinator.stop_loading();
        coordinator.stop_loading();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![LoadingState::busy("Uploading"), LoadingState::idle()]
        );
    }

    #[test]
    fn guard_finish_stops_only_once() {
        let coordinator = LoadingCoordinator::new(LoadingPolicy::Counted);
        let outer = coordinator.track("outer");
        let inner = coordinator.track("inner");
        inner.finish();
        assert!(coordinator.is_busy());
        drop(outer);
        assert!(!coordinator.is_busy());
    }

    #[test]
    fn policy_parses_config_strings() {
        assert_eq!(
            " Counted ".parse::<LoadingPolicy>().unwrap(),
            LoadingPolicy::Counted
        );
        assert_eq!(
            "last_writer_wins".parse::<LoadingPolicy>().unwrap(),
            LoadingPolicy::LastWriterWins
        );
        assert!("stack".parse::<LoadingPolicy>().is_err());
    }
}
