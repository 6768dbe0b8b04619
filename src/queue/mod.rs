//! Queue buffer and statistics.
//!
//! The buffer is an insertion-ordered deque: producers may push at either
//! end, only the run-loop removes items and only from the front.

pub(crate) mod state;

pub(crate) use state::{Next, QueueState};

/// Snapshot of a queue's state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Number of items waiting in the buffer
    pub pending: usize,
    /// Whether a run-loop is active
    pub running: bool,
    /// Number of items fully processed (success or failure)
    pub processed: u64,
    /// Number of items whose handler failed
    pub failed: u64,
    /// Number of `drain()` callers currently waiting
    pub drain_waiters: usize,
}

impl QueueStats {
    /// Whether the queue has no pending or in-flight work
    pub fn is_idle(&self) -> bool {
        self.pending == 0 && !self.running
    }
}
