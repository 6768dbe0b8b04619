//! Work item definitions.

use crate::error::{SequentError, SequentResult};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Unique identifier for a queued item
pub type ItemId = String;

/// A handler failure, shared between the error observers and the completion
/// callback of the failing item.
pub type HandlerError = Arc<SequentError>;

/// Where an item is inserted into the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    /// Processed next, ahead of everything already buffered
    Front,
    /// Processed after everything already buffered
    Back,
}

type CompletionFn = Box<dyn FnOnce(Option<HandlerError>) -> BoxFuture<'static, SequentResult<()>> + Send>;

/// Per-item callback invoked with the outcome of the handler.
///
/// Receives `None` when the handler succeeded and the handler's error
/// otherwise. Errors and panics raised by the callback are discarded by the
/// run-loop.
pub struct Completion(CompletionFn);

impl Completion {
    /// Wrap an async callback.
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: FnOnce(Option<HandlerError>) -> Fut + Send + 'static,
        Fut: Future<Output = SequentResult<()>> + Send + 'static,
    {
        Self(Box::new(move |outcome| callback(outcome).boxed()))
    }

    pub(crate) fn call(self, outcome: Option<HandlerError>) -> BoxFuture<'static, SequentResult<()>> {
        (self.0)(outcome)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Completion(..)")
    }
}

/// A payload waiting in (or just taken from) the queue buffer.
pub struct QueueItem<T> {
    /// Unique item identifier, used for log correlation
    pub id: ItemId,
    /// The unit of work handed to the handler
    pub payload: T,
    /// Optional outcome callback
    pub completion: Option<Completion>,
    /// When the item was enqueued
    pub enqueued_at: Instant,
}

impl<T> QueueItem<T> {
    /// Create an item without a completion callback
    pub fn new(payload: T) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            payload,
            completion: None,
            enqueued_at: Instant::now(),
        }
    }

    /// Create an item that reports its outcome to `completion`
    pub fn with_completion(payload: T, completion: Completion) -> Self {
        Self {
            completion: Some(completion),
            ..Self::new(payload)
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for QueueItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueItem")
            .field("id", &self.id)
            .field("payload", &self.payload)
            .field("has_completion", &self.completion.is_some())
            .finish()
    }
}
