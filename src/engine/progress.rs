//! Progress reporting contract between the executor and its caller.

use std::sync::Mutex;

/// One completion tick. `total` is fixed for the lifetime of a run;
/// `completed` never decreases and reaches `total` on the final event of an
/// uncancelled run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
}

/// Callers implement this to observe per-entry completion. The executor may
/// invoke it from worker threads.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, _event: ProgressEvent) {}
}

/// Discards all events.
pub struct SilentSink;

impl ProgressSink for SilentSink {}

/// Records every event in order; used by tests and by callers that only
/// want the log after the fact.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl ProgressSink for CollectingSink {
    fn on_progress(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
