//! Logging setup for applications embedding SequentQ.
//!
//! The queue itself only emits `tracing` events; installing a subscriber is
//! left to the caller. [`init`] is a convenience that turns a
//! [`LoggingConfig`] into a global `tracing-subscriber` fmt subscriber.

use crate::config::LoggingConfig;
use crate::error::{SequentError, SequentResult};

/// Install a global fmt subscriber built from `config`.
///
/// Fails with [`SequentError::ConfigError`] if a global subscriber is
/// already set.
pub fn init(config: &LoggingConfig) -> SequentResult<()> {
    let level: tracing::Level = config.level.into();
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(config.include_targets);

    let result = if config.json_format {
        let builder = builder.json();
        if config.include_timestamps {
            builder.try_init()
        } else {
            builder.without_time().try_init()
        }
    } else {
        let builder = builder.with_ansi(config.colored);
        if config.include_timestamps {
            builder.try_init()
        } else {
            builder.without_time().try_init()
        }
    };

    result.map_err(|e| SequentError::config(format!("failed to install tracing subscriber: {e}")))
}
