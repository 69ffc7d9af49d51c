//! Construction parameters for [`BoundedQueue`](crate::sync::bounded::BoundedQueue).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of slots when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Default upper bound on how long a cancellable wait sleeps before it
/// re-checks its [`CancelToken`](crate::sync::cancel::CancelToken).
pub const DEFAULT_CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Configuration for a bounded queue.
///
/// Derives `serde` traits so an embedding application can carry it in its own
/// configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum number of elements the queue can hold. Must be non-zero.
    pub capacity: usize,
    /// Longest single condvar sleep for a cancellable wait.
    pub cancel_poll_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            cancel_poll_interval: DEFAULT_CANCEL_POLL_INTERVAL,
        }
    }
}

impl QueueConfig {
    /// Config with the given capacity and default everything else.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Overrides the cancellation poll interval.
    #[must_use]
    pub const fn cancel_poll_interval(mut self, interval: Duration) -> Self {
        self.cancel_poll_interval = interval;
        self
    }

    /// Checks that the config can back a queue.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroCapacity`] if `capacity == 0`. A zero-slot queue
    ///   would reject every try-operation and block every blocking one forever.
    /// - [`ConfigError::ZeroPollInterval`] if `cancel_poll_interval` is zero,
    ///   which would turn cancellable waits into a busy loop.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.cancel_poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

/// Invalid queue configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Capacity was zero.
    #[error("queue capacity must be greater than 0")]
    ZeroCapacity,
    /// Cancel poll interval was zero.
    #[error("cancel poll interval must be non-zero")]
    ZeroPollInterval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = QueueConfig::default();
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.cancel_poll_interval, DEFAULT_CANCEL_POLL_INTERVAL);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = QueueConfig::with_capacity(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let config = QueueConfig::with_capacity(4).cancel_poll_interval(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollInterval));
    }

    #[test]
    fn test_builder_keeps_capacity() {
        let config = QueueConfig::with_capacity(7).cancel_poll_interval(Duration::from_millis(1));
        assert_eq!(config.capacity, 7);
        assert_eq!(config.cancel_poll_interval, Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_fills_missing_fields() {
        let config: QueueConfig = serde_json::from_str(r#"{"capacity": 8}"#).expect("deserialize");
        assert_eq!(config.capacity, 8);
        assert_eq!(config.cancel_poll_interval, DEFAULT_CANCEL_POLL_INTERVAL);

        let config: QueueConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(config, QueueConfig::default());
    }

    #[test]
    fn test_serialize_round_trip_keeps_poll_interval() {
        let config = QueueConfig::with_capacity(3).cancel_poll_interval(Duration::from_micros(250));
        let json = serde_json::to_string(&config).expect("serialize");
        let decoded: QueueConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::ZeroCapacity.to_string(),
            "queue capacity must be greater than 0"
        );
        assert_eq!(
            ConfigError::ZeroPollInterval.to_string(),
            "cancel poll interval must be non-zero"
        );
    }
}
