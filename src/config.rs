//! Configuration types for SequentQ.
//!
//! This module contains the configuration structures used by a
//! [`SequentialQueue`](crate::core::SequentialQueue): the inter-item delay of
//! the run-loop and the logging setup.

use crate::error::SequentResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound accepted for the inter-item delay (one hour).
pub const MAX_DELAY_MS: u64 = 60 * 60 * 1000;

/// Main configuration for SequentQ.
///
/// # Examples
///
/// ```rust
/// use sequentq::config::{QueueConfig, SequentConfig};
///
/// // Use default configuration (no delay between items)
/// let config = SequentConfig::default();
///
/// // Pause 250ms after every processed item
/// let config = SequentConfig {
///     queue: QueueConfig::default().with_delay_ms(250),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SequentConfig {
    /// Run-loop configuration
    pub queue: QueueConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Run-loop configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Pause after every processed item (in milliseconds, 0 = no pause)
    pub delay_ms: u64,
}

impl QueueConfig {
    /// Set the inter-item delay.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// The inter-item delay, or `None` when the loop should not pause.
    pub fn delay(&self) -> Option<Duration> {
        (self.delay_ms > 0).then(|| self.delay_ms.millis())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: LogLevel,

    /// Enable structured JSON logging
    pub json_format: bool,

    /// Enable colored output (ignored if json_format is true)
    pub colored: bool,

    /// Include timestamps in logs
    pub include_timestamps: bool,

    /// Include target module in logs
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            json_format: false,
            colored: true,
            include_timestamps: true,
            include_targets: false,
        }
    }
}

/// Log level enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Helper trait for converting durations in configuration.
pub trait DurationExt {
    /// Convert seconds to Duration
    fn secs(self) -> Duration;
    /// Convert milliseconds to Duration
    fn millis(self) -> Duration;
}

impl DurationExt for u64 {
    fn secs(self) -> Duration {
        Duration::from_secs(self)
    }

    fn millis(self) -> Duration {
        Duration::from_millis(self)
    }
}

impl SequentConfig {
    /// Create a configuration with a fixed inter-item delay.
    ///
    /// The delay is kept at millisecond precision, rounded up so a non-zero
    /// delay never shrinks, and clamped to [`MAX_DELAY_MS`].
    pub fn with_delay(delay: Duration) -> Self {
        let delay_ms = u64::try_from(delay.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX);

        Self {
            queue: QueueConfig {
                delay_ms: delay_ms.min(MAX_DELAY_MS),
            },
            ..Default::default()
        }
    }

    /// Create a new configuration optimized for development.
    pub fn development() -> Self {
        Self {
            queue: QueueConfig::default(),
            logging: LoggingConfig {
                level: LogLevel::Debug,
                colored: true,
                include_targets: true,
                ..Default::default()
            },
        }
    }

    /// Create a new configuration optimized for production.
    pub fn production() -> Self {
        Self {
            queue: QueueConfig::default(),
            logging: LoggingConfig {
                level: LogLevel::Info,
                json_format: true,
                colored: false,
                include_timestamps: true,
                include_targets: false,
            },
        }
    }

    /// Create a configuration for testing.
    pub fn testing() -> Self {
        Self {
            queue: QueueConfig::default(),
            logging: LoggingConfig {
                level: LogLevel::Debug,
                colored: false,
                include_timestamps: false,
                include_targets: true,
                ..Default::default()
            },
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> SequentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.queue.delay_ms > MAX_DELAY_MS {
            errors.push(format!(
                "Queue delay must not exceed {} ms (got {})",
                MAX_DELAY_MS, self.queue.delay_ms
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SequentConfig::default();
        assert_eq!(config.queue.delay_ms, 0);
        assert!(config.queue.delay().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_development_config() {
        let config = SequentConfig::development();
        assert!(matches!(config.logging.level, LogLevel::Debug));
        assert!(config.logging.include_targets);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_config() {
        let config = SequentConfig::production();
        assert!(matches!(config.logging.level, LogLevel::Info));
        assert!(config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config() {
        let config = SequentConfig::testing();
        assert!(!config.logging.include_timestamps);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SequentConfig::default();
        assert!(config.validate().is_ok());

        config.queue.delay_ms = MAX_DELAY_MS + 1;
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("delay")));
    }

    #[test]
    fn test_with_delay() {
        let config = SequentConfig::with_delay(Duration::from_millis(40));
        assert_eq!(config.queue.delay_ms, 40);
        assert_eq!(config.queue.delay(), Some(Duration::from_millis(40)));

        let config = SequentConfig::with_delay(Duration::ZERO);
        assert!(config.queue.delay().is_none());
    }

    #[test]
    fn test_with_delay_rounds_up_sub_millisecond() {
        let config = SequentConfig::with_delay(Duration::from_micros(500));
        assert_eq!(config.queue.delay_ms, 1);

        let config = SequentConfig::with_delay(Duration::from_micros(1500));
        assert_eq!(config.queue.delay_ms, 2);

        let config = SequentConfig::with_delay(Duration::from_nanos(1));
        assert_eq!(config.queue.delay(), Some(Duration::from_millis(1)));
    }

    #[test]
    fn test_with_delay_clamps_to_max() {
        let config = SequentConfig::with_delay(Duration::from_secs(7200));
        assert_eq!(config.queue.delay_ms, MAX_DELAY_MS);
        assert!(config.validate().is_ok());

        let config = SequentConfig::with_delay(Duration::MAX);
        assert_eq!(config.queue.delay_ms, MAX_DELAY_MS);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SequentConfig::from_json(r#"{ "queue": { "delay_ms": 15 } }"#).unwrap();
        assert_eq!(config.queue.delay_ms, 15);
        assert!(matches!(config.logging.level, LogLevel::Info));

        let config = SequentConfig::from_json(r#"{ "logging": { "level": "Warn" } }"#).unwrap();
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.queue, QueueConfig::default());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = SequentConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::SequentError::SerializationError(_)));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
        assert_eq!(tracing::Level::from(LogLevel::Trace), tracing::Level::TRACE);
    }

    #[test]
    fn test_duration_ext() {
        assert_eq!(5u64.secs(), Duration::from_secs(5));
        assert_eq!(1500u64.millis(), Duration::from_millis(1500));
    }
}
