//! The run-loop that drives a queue.
//!
//! One activation of the loop takes items off the front of the buffer one at
//! a time until it finds the buffer empty, then goes idle and releases every
//! drain waiter. Per item it awaits the handler, notifies the error observers
//! on failure, awaits the completion callback and finally sleeps for the
//! configured delay.

use crate::config::SequentConfig;
use crate::core::handler::Handler;
use crate::core::observer::ErrorObservers;
use crate::error::SequentError;
use crate::queue::{Next, QueueState};
use crate::task::{HandlerError, QueueItem};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::time::sleep;
use tracing::Instrument;

/// State shared between a queue handle and its run-loop task.
pub(crate) struct QueueCore<T: Send + 'static> {
    pub(crate) id: String,
    pub(crate) config: SequentConfig,
    pub(crate) handler: Arc<dyn Handler<T>>,
    pub(crate) state: Mutex<QueueState<T>>,
    pub(crate) observers: ErrorObservers<T>,
    pub(crate) processed: AtomicU64,
    pub(crate) failed: AtomicU64,
    runtime: Handle,
}

impl<T: Send + 'static> QueueCore<T> {
    pub(crate) fn new(handler: Arc<dyn Handler<T>>, config: SequentConfig, runtime: Handle) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            config,
            handler,
            state: Mutex::new(QueueState::new()),
            observers: ErrorObservers::new(),
            processed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            runtime,
        }
    }

    /// Lock the buffer state. Nothing panics while holding it, so a poisoned
    /// lock still holds consistent state.
    pub(crate) fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Post a loop activation to the runtime. Callers must have claimed the
    /// start through [`QueueState::claim_start`] first.
    pub(crate) fn schedule(self: &Arc<Self>) {
        let core = Arc::clone(self);
        tracing::debug!(queue = %self.id, "scheduling run-loop");
        self.runtime.spawn(run(core));
    }
}

/// One activation of the run-loop.
pub(crate) async fn run<T: Send + 'static>(core: Arc<QueueCore<T>>) {
    let span = tracing::debug_span!("sequentq.run", queue = %core.id);

    async move {
        tracing::debug!("run-loop started");
        let delay = core.config.queue.delay();

        loop {
            let next = core.lock().next();
            let item = match next {
                Next::Item(item) => item,
                Next::Idle(waiters) => {
                    tracing::debug!(released = waiters.len(), "queue drained, going idle");
                    for waiter in waiters {
                        let _ = waiter.send(());
                    }
                    return;
                }
            };

            process_item(&core, item).await;

            if let Some(delay) = delay {
                sleep(delay).await;
            }
        }
    }
    .instrument(span)
    .await
}

/// Handle a single item. Handler failures, including panics, are captured
/// and reported; completion failures are discarded.
async fn process_item<T: Send + 'static>(core: &QueueCore<T>, item: QueueItem<T>) {
    let QueueItem {
        id,
        payload,
        completion,
        enqueued_at,
    } = item;

    tracing::debug!(item = %id, waited = ?enqueued_at.elapsed(), "processing item");
    let started = Instant::now();

    // Kept for the error observers; the handler consumes the original.
    let retained = core.observers.retain(&payload);
    let handler = Arc::clone(&core.handler);
    let outcome = AssertUnwindSafe(async move { handler.handle(payload).await })
        .catch_unwind()
        .await;

    let error: Option<HandlerError> = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(Arc::new(e)),
        Err(panic) => Some(Arc::new(SequentError::from_panic(panic))),
    };

    match &error {
        None => {
            tracing::debug!(item = %id, elapsed = ?started.elapsed(), "item processed");
        }
        Some(err) => {
            core.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(item = %id, error = %err, "handler failed");
            if let Some(payload) = &retained {
                core.observers.notify(err, payload);
            }
        }
    }

    if let Some(completion) = completion {
        let _ = AssertUnwindSafe(async move { completion.call(error).await })
            .catch_unwind()
            .await;
    }

    core.processed.fetch_add(1, Ordering::Relaxed);
}
