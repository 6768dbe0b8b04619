//! The mutable heart of a queue: buffer, run flag and drain waiters.
//!
//! All three live behind a single lock so that inserting an item, claiming
//! the right to start the run-loop, taking the next item and flipping back to
//! idle are serialized with one another. That is what makes loop start
//! idempotent and rules out lost drain wakeups.

use crate::task::{Position, QueueItem};
use std::collections::VecDeque;
use tokio::sync::oneshot;

/// What the run-loop should do next.
pub(crate) enum Next<T> {
    /// Process this item
    Item(QueueItem<T>),
    /// Buffer is empty; the loop is now idle and must release these waiters
    Idle(Vec<oneshot::Sender<()>>),
}

pub(crate) struct QueueState<T> {
    items: VecDeque<QueueItem<T>>,
    running: bool,
    drain_waiters: Vec<oneshot::Sender<()>>,
}

impl<T> QueueState<T> {
    pub(crate) fn new() -> Self {
        Self {
            items: VecDeque::new(),
            running: false,
            drain_waiters: Vec::new(),
        }
    }

    /// Insert an item. Returns `true` when the caller has claimed the loop
    /// start and must schedule a run-loop.
    pub(crate) fn insert(&mut self, item: QueueItem<T>, position: Position) -> bool {
        match position {
            Position::Front => self.items.push_front(item),
            Position::Back => self.items.push_back(item),
        }
        self.claim_start()
    }

    /// Claim the loop start if pending items have no loop to run them.
    pub(crate) fn claim_start(&mut self) -> bool {
        if self.running || self.items.is_empty() {
            return false;
        }
        self.running = true;
        true
    }

    /// Take the front item, or go idle and hand back every drain waiter.
    pub(crate) fn next(&mut self) -> Next<T> {
        match self.items.pop_front() {
            Some(item) => Next::Item(item),
            None => {
                self.running = false;
                Next::Idle(std::mem::take(&mut self.drain_waiters))
            }
        }
    }

    /// Register a one-shot drain waiter. Returns `None` when the queue is
    /// already empty and idle, in which case there is nothing to wait for.
    pub(crate) fn register_drain(&mut self) -> Option<oneshot::Receiver<()>> {
        if self.items.is_empty() && !self.running {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        self.drain_waiters.push(tx);
        Some(rx)
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn drain_waiters(&self) -> usize {
        self.drain_waiters.len()
    }
}
