//! The sequential queue engine.
//!
//! [`SequentialQueue`] owns an ordered buffer of work items and a single
//! background run-loop that feeds them, one at a time, to a user supplied
//! [`Handler`]. Producers never run the handler themselves: enqueueing only
//! mutates the buffer and, when the queue is idle, posts a loop activation to
//! the tokio runtime.

use crate::config::SequentConfig;
use crate::error::{SequentError, SequentResult};
use crate::queue::QueueStats;
use crate::task::{Completion, HandlerError, Position, QueueItem};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::runtime::Handle;

pub mod handler;
pub mod observer;
pub(crate) mod worker;

pub use handler::Handler;
pub use observer::{ErrorObserver, ErrorObservers};

use worker::QueueCore;

/// A single-consumer, strictly sequential task queue.
///
/// Payloads are processed one at a time, in buffer order, by the handler the
/// queue was built with. A handler failure is reported to the registered
/// error observers and to the item's completion callback, and the loop moves
/// on to the next item.
///
/// Cloning a `SequentialQueue` yields another handle to the same queue.
/// Dropping every handle does not abort an active run-loop; it finishes the
/// buffered items first.
///
/// # Examples
///
/// ```rust
/// use sequentq::prelude::*;
///
/// #[tokio::main]
/// async fn main() {
///     let queue = SequentialQueue::<u32>::new(|n: u32| async move {
///         tracing::info!("handling {}", n);
///         SequentResult::Ok(())
///     });
///
///     queue.enqueue_back(1).enqueue_back(2).enqueue_front(0);
///     queue.drain().await;
///     assert!(queue.is_empty());
/// }
/// ```
pub struct SequentialQueue<T: Send + 'static> {
    core: Arc<QueueCore<T>>,
}

impl<T: Send + 'static> Clone for SequentialQueue<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Send + 'static> SequentialQueue<T> {
    /// Create a queue with the default configuration (no inter-item delay).
    ///
    /// The queue spawns its run-loop on the runtime current at construction.
    /// That runtime must outlive the queue: once it has shut down, a loop
    /// activation is dropped unrun, the queue stays marked running and
    /// [`drain`](Self::drain) never resolves.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime. Use
    /// [`with_config`](Self::with_config) for a fallible constructor.
    pub fn new<H: Handler<T>>(handler: H) -> Self {
        Self::build(handler, SequentConfig::default(), Handle::current())
    }

    /// Create a queue that pauses for `delay` after every processed item.
    ///
    /// `delay` is rounded up to whole milliseconds and clamped to
    /// [`MAX_DELAY_MS`](crate::config::MAX_DELAY_MS), so the resulting
    /// configuration always passes validation. The runtime caveat of
    /// [`new`](Self::new) applies.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn with_delay<H: Handler<T>>(handler: H, delay: Duration) -> Self {
        Self::build(handler, SequentConfig::with_delay(delay), Handle::current())
    }

    /// Create a queue from an explicit configuration.
    ///
    /// Fails on an invalid configuration or outside of a tokio runtime. As
    /// with [`new`](Self::new), the captured runtime must outlive the queue.
    pub fn with_config<H: Handler<T>>(handler: H, config: SequentConfig) -> SequentResult<Self> {
        config
            .validate()
            .map_err(|errors| SequentError::config(errors.join("; ")))?;
        let runtime = Handle::try_current().map_err(|_| SequentError::NoRuntime)?;

        Ok(Self::build(handler, config, runtime))
    }

    fn build<H: Handler<T>>(handler: H, config: SequentConfig, runtime: Handle) -> Self {
        let core = QueueCore::new(Arc::new(handler), config, runtime);
        tracing::debug!(queue = %core.id, delay_ms = core.config.queue.delay_ms, "queue created");

        Self {
            core: Arc::new(core),
        }
    }

    /// Append a payload to the tail of the queue.
    pub fn enqueue_back(&self, payload: T) -> &Self {
        self.enqueue(QueueItem::new(payload), Position::Back)
    }

    /// Append a payload to the tail of the queue and report its outcome to
    /// `completion`.
    pub fn enqueue_back_with<F, Fut>(&self, payload: T, completion: F) -> &Self
    where
        F: FnOnce(Option<HandlerError>) -> Fut + Send + 'static,
        Fut: Future<Output = SequentResult<()>> + Send + 'static,
    {
        let item = QueueItem::with_completion(payload, Completion::new(completion));
        self.enqueue(item, Position::Back)
    }

    /// Insert a payload at the head of the queue, so it is processed right
    /// after the item currently being handled (if any).
    pub fn enqueue_front(&self, payload: T) -> &Self {
        self.enqueue(QueueItem::new(payload), Position::Front)
    }

    /// Insert a payload at the head of the queue and report its outcome to
    /// `completion`.
    pub fn enqueue_front_with<F, Fut>(&self, payload: T, completion: F) -> &Self
    where
        F: FnOnce(Option<HandlerError>) -> Fut + Send + 'static,
        Fut: Future<Output = SequentResult<()>> + Send + 'static,
    {
        let item = QueueItem::with_completion(payload, Completion::new(completion));
        self.enqueue(item, Position::Front)
    }

    /// Insert a prepared item. The run-loop is never started inline: when
    /// the queue is idle an activation is posted to the runtime.
    pub fn enqueue(&self, item: QueueItem<T>, position: Position) -> &Self {
        let item_id = item.id.clone();
        let start = self.core.lock().insert(item, position);

        tracing::debug!(queue = %self.core.id, item = %item_id, ?position, "item enqueued");

        if start {
            self.core.schedule();
        }
        self
    }

    /// Wait until the buffer is empty and no item is being processed.
    ///
    /// Resolves immediately on an idle, empty queue. Every caller waiting
    /// when the loop goes idle is released together; callers arriving later
    /// wait for the next time the loop empties the buffer.
    pub async fn drain(&self) {
        let (waiter, start) = {
            let mut state = self.core.lock();
            let waiter = state.register_drain();
            let start = waiter.is_some() && state.claim_start();
            (waiter, start)
        };

        let Some(waiter) = waiter else {
            return;
        };

        if start {
            self.core.schedule();
        }

        // The sender lives in the queue state we hold a reference to, so it
        // is only ever dropped after being fired.
        let _ = waiter.await;
    }

    /// Unique identifier of this queue, as it appears in logs
    pub fn id(&self) -> &str {
        &self.core.id
    }

    /// Configuration the queue was built with
    pub fn config(&self) -> &SequentConfig {
        &self.core.config
    }

    /// Number of items waiting in the buffer (excluding the one in flight)
    pub fn len(&self) -> usize {
        self.core.lock().len()
    }

    /// Whether the buffer holds no waiting items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a run-loop is active or scheduled
    pub fn is_running(&self) -> bool {
        self.core.lock().is_running()
    }

    /// Snapshot of the queue's counters
    pub fn stats(&self) -> QueueStats {
        let (pending, running, drain_waiters) = {
            let state = self.core.lock();
            (state.len(), state.is_running(), state.drain_waiters())
        };

        QueueStats {
            pending,
            running,
            processed: self.core.processed.load(Ordering::Relaxed),
            failed: self.core.failed.load(Ordering::Relaxed),
            drain_waiters,
        }
    }
}

impl<T: Clone + Send + 'static> SequentialQueue<T> {
    /// Register an observer called with the error and payload of every
    /// failing item, before that item's completion callback runs.
    ///
    /// Once an observer is registered the queue keeps a clone of each
    /// payload while its handler runs. An observer registered while an item
    /// is already in flight first hears about the next item's failure.
    ///
    /// Observers must not panic: a panicking observer takes the run-loop
    /// down with it and leaves the queue stuck in the running state.
    pub fn on_error<F>(&self, observer: F) -> &Self
    where
        F: Fn(&SequentError, &T) + Send + Sync + 'static,
    {
        self.core.observers.register(Arc::new(observer));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio_test::assert_ok;

    fn recording_queue(seen: Arc<Mutex<Vec<u32>>>) -> SequentialQueue<u32> {
        SequentialQueue::new(move |n: u32| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(n);
                SequentResult::Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_queue_creation() {
        let queue = recording_queue(Arc::new(Mutex::new(Vec::new())));
        assert!(queue.is_empty());
        assert!(!queue.is_running());
        assert!(!queue.id().is_empty());
        assert!(queue.stats().is_idle());
    }

    #[tokio::test]
    async fn test_enqueue_never_runs_inline() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let queue = recording_queue(seen.clone());

        queue.enqueue_back(1).enqueue_back(2);

        // Current-thread runtime: the loop cannot have run before we yield.
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(queue.len(), 2);
        assert!(queue.is_running());

        queue.drain().await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_enqueue_front_before_loop_starts() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let queue = recording_queue(seen.clone());

        // Both inserts land before the deferred loop picks anything up.
        queue.enqueue_back(1).enqueue_front(2);
        queue.drain().await;

        assert_eq!(*seen.lock().unwrap(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_drain_on_idle_queue_returns_immediately() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let queue = recording_queue(seen.clone());

        queue.drain().await;
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(queue.stats().drain_waiters, 0);
    }

    #[tokio::test]
    async fn test_queue_restarts_after_idle() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let queue = recording_queue(seen.clone());

        queue.enqueue_back(1);
        queue.drain().await;
        assert!(!queue.is_running());

        queue.enqueue_back(2);
        queue.drain().await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(queue.stats().processed, 2);
    }

    #[tokio::test]
    async fn test_completion_sees_outcome() {
        let queue = SequentialQueue::<u32>::new(|n: u32| async move {
            if n % 2 == 0 {
                return Err(SequentError::handler(format!("{n} is even")));
            }
            Ok(())
        });

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        for n in 1..=2 {
            let outcomes = outcomes.clone();
            queue.enqueue_back_with(n, move |outcome| async move {
                outcomes
                    .lock()
                    .unwrap()
                    .push((n, outcome.map(|e| e.to_string())));
                SequentResult::Ok(())
            });
        }
        queue.drain().await;

        let outcomes = outcomes.lock().unwrap();
        assert_eq!(
            *outcomes,
            vec![(1, None), (2, Some("Handler failed: 2 is even".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_completion_error_does_not_stop_queue() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let queue = recording_queue(seen.clone());

        queue
            .enqueue_back_with(1, |_| async {
                SequentResult::<()>::Err(SequentError::handler("completion broke"))
            })
            .enqueue_back(2);
        queue.drain().await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(queue.stats().failed, 0);
    }

    #[tokio::test]
    async fn test_stats_count_failures() {
        let queue = SequentialQueue::<&'static str>::new(|p: &'static str| async move {
            if p == "bad" {
                return Err(SequentError::handler("rejected"));
            }
            Ok(())
        });

        queue.enqueue_back("good").enqueue_back("bad").enqueue_back("good");
        queue.drain().await;

        let stats = queue.stats();
        assert_eq!(stats.processed, 3);
        assert_eq!(stats.failed, 1);
        assert!(stats.is_idle());
    }

    #[tokio::test]
    async fn test_clones_share_the_queue() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let queue = recording_queue(seen.clone());
        let other = queue.clone();

        other.enqueue_back(5);
        queue.drain().await;

        assert_eq!(queue.id(), other.id());
        assert_eq!(*seen.lock().unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn test_with_config_validates() {
        let mut config = SequentConfig::default();
        config.queue.delay_ms = crate::config::MAX_DELAY_MS + 1;

        let result =
            SequentialQueue::<u32>::with_config(|_n: u32| async { SequentResult::Ok(()) }, config);
        assert!(matches!(result, Err(SequentError::ConfigError { .. })));

        let queue = assert_ok!(SequentialQueue::<u32>::with_config(
            |_n: u32| async { SequentResult::Ok(()) },
            SequentConfig::with_delay(Duration::from_millis(5)),
        ));
        assert_eq!(queue.config().queue.delay_ms, 5);
    }

    #[tokio::test]
    async fn test_with_delay_yields_valid_config() {
        let queue = SequentialQueue::<u32>::with_delay(
            |_n: u32| async { SequentResult::Ok(()) },
            Duration::from_secs(7200),
        );
        assert_eq!(queue.config().queue.delay_ms, crate::config::MAX_DELAY_MS);
        assert_ok!(queue.config().validate());
    }

    #[test]
    fn test_with_config_outside_runtime() {
        let result = SequentialQueue::<u32>::with_config(
            |_n: u32| async { SequentResult::Ok(()) },
            SequentConfig::default(),
        );
        assert!(matches!(result, Err(SequentError::NoRuntime)));
    }
}
