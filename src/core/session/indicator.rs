use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::shared::emit::EventEmitter;
use crate::shared::events::AppEvent;

/// Transient "copied" flag that switches itself off after a hold period.
/// A newer flash extends the hold instead of being cut short by an older timer.
#[derive(Debug, Clone, Default)]
pub struct CopyIndicator {
    copied: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl CopyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.copied.load(Ordering::SeqCst)
    }

    /// Raise the flag and schedule its reset. Must run inside a tokio runtime.
    pub fn flash(&self, hold: Duration, events: &EventEmitter) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.copied.store(true, Ordering::SeqCst);
        events.emit_event(AppEvent::CopiedChanged(true));

        let indicator = self.clone();
        let events = events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            if indicator.generation.load(Ordering::SeqCst) == generation {
                indicator.copied.store(false, Ordering::SeqCst);
                events.emit_event(AppEvent::CopiedChanged(false));
            }
        });
    }
}
