use tokio::sync::broadcast;
use tracing::trace;
use super::events::AppEvent;

const EVENT_CAPACITY: usize = 64;

/// Fan-out of application events to whoever renders them
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<AppEvent>,
}

impl EventEmitter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Emit an application event to all subscribers
    pub fn emit_event(&self, event: AppEvent) {
        let channel = event.channel();
        // No subscribers is fine; nobody is rendering yet.
        if self.tx.send(event).is_err() {
            trace!(channel, "event dropped, no subscribers");
        }
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}
