//! Error types for SequentQ operations.

use thiserror::Error;

/// Result type used throughout SequentQ.
pub type SequentResult<T> = Result<T, SequentError>;

/// Main error type for SequentQ operations.
#[derive(Error, Debug)]
pub enum SequentError {
    /// The payload handler returned an error
    #[error("Handler failed: {message}")]
    HandlerFailed {
        /// Error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The payload handler panicked while processing an item
    #[error("Handler panicked: {message}")]
    HandlerPanicked {
        /// Panic message, if it could be recovered
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Error message
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A queue was built outside of a tokio runtime
    #[error("No tokio runtime available to run the queue")]
    NoRuntime,
}

impl SequentError {
    /// Create a handler failure from a plain message
    pub fn handler(message: impl Into<String>) -> Self {
        Self::HandlerFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a handler failure wrapping an underlying error
    pub fn handler_failed<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::HandlerFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Build a panic error from the payload returned by `catch_unwind`.
    pub(crate) fn from_panic(panic: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = panic.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };

        Self::HandlerPanicked { message }
    }
}
