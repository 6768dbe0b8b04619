//! # SequentQ
//!
//! A strictly sequential async task queue for Rust applications.
//!
//! ## Features
//!
//! - **One at a time**: a single background run-loop hands payloads to your
//!   handler in buffer order; two payloads are never handled concurrently
//! - **Head or tail insertion**: `enqueue_back` for FIFO work,
//!   `enqueue_front` to jump ahead of everything still waiting
//! - **Drain**: wait until the buffer is empty and the loop is idle
//! - **Fault isolation**: handler errors and panics are reported to error
//!   observers and completion callbacks, and the loop carries on
//! - **Observability**: built-in `tracing` instrumentation
//!
//! ## Quick Start
//!
//! ```rust
//! use sequentq::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! #[tokio::main]
//! async fn main() -> SequentResult<()> {
//!     let results = Arc::new(Mutex::new(Vec::new()));
//!
//!     let queue = SequentialQueue::<u32>::new(|n: u32| async move {
//!         if n == 0 {
//!             return Err(SequentError::handler("zero is not allowed"));
//!         }
//!         Ok(())
//!     });
//!
//!     queue.on_error(|err, payload| tracing::error!("{} failed: {}", payload, err));
//!
//!     for n in [1, 2, 3] {
//!         let results = results.clone();
//!         queue.enqueue_back_with(n, move |outcome| async move {
//!             results.lock().unwrap().push((n, outcome.is_none()));
//!             SequentResult::Ok(())
//!         });
//!     }
//!
//!     queue.drain().await;
//!     assert_eq!(results.lock().unwrap().len(), 3);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod queue;
pub mod task;

pub mod prelude {
    pub use crate::config::*;
    pub use crate::core::{Handler, SequentialQueue};
    pub use crate::error::{SequentError, SequentResult};
    pub use crate::queue::QueueStats;
    pub use crate::task::{Completion, HandlerError, ItemId, Position, QueueItem};
    pub use async_trait::async_trait;
}

pub use crate::config::*;
pub use crate::core::{ErrorObserver, Handler, SequentialQueue};
pub use crate::error::{SequentError, SequentResult};
pub use crate::queue::QueueStats;
pub use crate::task::{Completion, HandlerError, ItemId, Position, QueueItem};
pub use async_trait::async_trait;
