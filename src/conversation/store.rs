//! In-memory conversation store
//!
//! Holds the append-only transcript and the pending flag. Both live under
//! one lock so an observer can never see the flag without the entry that
//! preceded it. Each mutation publishes a [`StoreEvent`] while the lock is
//! still held, which keeps event order identical to mutation order.

use super::entry::TranscriptEntry;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 128;

/// Change notification sent to store observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Appended(TranscriptEntry),
    PendingChanged(bool),
    Cleared,
}

/// Immutable view of the transcript at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript(Arc<Vec<TranscriptEntry>>);

impl Deref for Transcript {
    type Target = [TranscriptEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Default)]
struct StoreState {
    // Copy-on-write: outstanding snapshots keep the old vector alive
    entries: Arc<Vec<TranscriptEntry>>,
    pending: bool,
}

/// The only mutable client state: ordered entries plus the pending flag
#[derive(Debug)]
pub struct ConversationStore {
    state: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl ConversationStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(StoreState::default()),
            events,
        }
    }

    /// A store seeded with one entry, as at session start
    pub fn seeded(first: TranscriptEntry) -> Self {
        let store = Self::new();
        store.append(first);
        store
    }

    // The state is consistent after every statement, so a poisoned lock
    // still guards valid data.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn append(&self, entry: TranscriptEntry) {
        let mut state = self.lock();
        Arc::make_mut(&mut state.entries).push(entry.clone());
        self.publish(StoreEvent::Appended(entry));
    }

    pub fn set_pending(&self, pending: bool) {
        let mut state = self.lock();
        state.pending = pending;
        self.publish(StoreEvent::PendingChanged(pending));
    }

    /// Empty the transcript. The pending flag is left alone.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries = Arc::new(Vec::new());
        self.publish(StoreEvent::Cleared);
    }

    pub fn snapshot(&self) -> Transcript {
        Transcript(Arc::clone(&self.lock().entries))
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only handle on a store, handed to presentation code
#[derive(Debug, Clone)]
pub struct ConversationView {
    store: Arc<ConversationStore>,
}

impl ConversationView {
    pub fn new(store: Arc<ConversationStore>) -> Self {
        Self { store }
    }

    pub fn snapshot(&self) -> Transcript {
        self.store.snapshot()
    }

    pub fn is_pending(&self) -> bool {
        self.store.is_pending()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }
}
