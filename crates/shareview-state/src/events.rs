//! Change notifications broadcast by the selection engine.

use serde::Serialize;
use tokio::sync::broadcast;

use shareview_core::defaults::EVENT_BUS_CAPACITY;

/// Something observable changed in the engine's state.
///
/// Serialized with a `type` tag, e.g.
/// `{"type":"LoadFinished","request":3,"image_count":12,"people_count":4}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum StateEvent {
    /// A load or refresh entered `Loading`.
    LoadStarted { request: u64 },
    /// The latest load succeeded and its data is now displayed.
    LoadFinished {
        request: u64,
        image_count: usize,
        people_count: usize,
        skipped_count: usize,
    },
    /// The latest load failed; previous data is still displayed.
    LoadFailed {
        request: u64,
        message: String,
        retryable: bool,
    },
    /// The person filter changed. `None` means "show all".
    SelectionChanged {
        #[serde(skip_serializing_if = "Option::is_none")]
        identifier: Option<String>,
    },
    /// The session ended and all data was cleared.
    Reset,
}

/// Broadcast fan-out for [`StateEvent`]s.
///
/// Sending never blocks; with no subscribers events are dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StateEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn emit(&self, event: StateEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_BUS_CAPACITY)
    }
}
