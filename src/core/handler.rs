//! The payload handler seam.

use crate::error::SequentResult;
use async_trait::async_trait;
use std::future::Future;

/// Processes one payload at a time on behalf of a
/// [`SequentialQueue`](crate::core::SequentialQueue).
///
/// Implemented for any `Fn(T) -> impl Future<Output = SequentResult<()>>`, so
/// an async closure is usually enough. Implement it by hand when the handler
/// carries its own state.
///
/// # Examples
///
/// ```rust
/// use sequentq::prelude::*;
///
/// struct Mailer {
///     sender: String,
/// }
///
/// #[async_trait]
/// impl Handler<String> for Mailer {
///     async fn handle(&self, to: String) -> SequentResult<()> {
///         if to.is_empty() {
///             return Err(SequentError::handler("empty recipient"));
///         }
///         tracing::info!("{} -> {}", self.sender, to);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<T: Send + 'static>: Send + Sync + 'static {
    /// Handle a single payload. An `Err` is reported to the error observers
    /// and the item's completion callback; it never stops the queue.
    async fn handle(&self, payload: T) -> SequentResult<()>;
}

#[async_trait]
impl<T, F, Fut> Handler<T> for F
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = SequentResult<()>> + Send + 'static,
{
    async fn handle(&self, payload: T) -> SequentResult<()> {
        (self)(payload).await
    }
}
