//! # Coordinator Configuration
//!
//! Typed configuration for the lock service, the three handlers, the consumer
//! worker pool and logging. Every section has working defaults so an empty
//! configuration file (or none at all) yields a usable in-memory setup.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use topic_coordinator::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let ttl = manager.config().queue_drain.lock_ttl();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{defaults, DRAIN_LOCK_PREFIX, STOP_LOCK_PREFIX, SUMMARY_TASK_COMPLETED_EVENT};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub lock: LockConfig,
    pub queue_drain: QueueDrainConfig,
    pub stop_task: StopTaskConfig,
    pub notifier: NotifierConfig,
    pub consumer: ConsumerConfig,
    pub logging: LoggingConfig,
}

impl CoordinatorConfig {
    /// Reject values that would make the coordinator misbehave at runtime
    pub fn validate(&self) -> ConfigResult<()> {
        if self.queue_drain.lock_ttl_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "queue_drain.lock_ttl_seconds",
                "0",
                "lock TTL must be at least one second",
            ));
        }
        if self.stop_task.lock_ttl_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "stop_task.lock_ttl_seconds",
                "0",
                "lock TTL must be at least one second",
            ));
        }
        if self.stop_task.max_concurrent_topics == 0 {
            return Err(ConfigurationError::invalid_value(
                "stop_task.max_concurrent_topics",
                "0",
                "at least one topic group must be processed at a time",
            ));
        }
        if self.lock.spin_interval_ms == 0 || self.lock.spin_interval_ms > self.lock.spin_timeout_ms {
            return Err(ConfigurationError::invalid_value(
                "lock.spin_interval_ms",
                self.lock.spin_interval_ms.to_string(),
                format!(
                    "spin interval must be between 1 and spin_timeout_ms ({})",
                    self.lock.spin_timeout_ms
                ),
            ));
        }
        if self.consumer.worker_count == 0 {
            return Err(ConfigurationError::invalid_value(
                "consumer.worker_count",
                "0",
                "at least one consumer worker is required",
            ));
        }
        if self.consumer.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "consumer.channel_capacity",
                "0",
                "channel capacity must be positive",
            ));
        }
        if self.lock.backend == LockBackendKind::Redis && self.lock.redis.url.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field("lock.redis.url", "redis lock backend"));
        }
        Ok(())
    }
}

/// Which coordination store backs the lock service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockBackendKind {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    pub backend: LockBackendKind,
    pub redis: RedisConfig,
    /// Prefix for owner tokens, usually the host or pod name
    pub instance_id: String,
    /// Total window a spin-mode acquisition keeps retrying
    pub spin_timeout_ms: u64,
    /// Pause between spin-mode attempts
    pub spin_interval_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            backend: LockBackendKind::Memory,
            redis: RedisConfig::default(),
            instance_id: "coordinator".to_string(),
            spin_timeout_ms: defaults::SPIN_TIMEOUT_MS,
            spin_interval_ms: defaults::SPIN_INTERVAL_MS,
        }
    }
}

impl LockConfig {
    pub fn spin_timeout(&self) -> Duration {
        Duration::from_millis(self.spin_timeout_ms)
    }

    pub fn spin_interval(&self) -> Duration {
        Duration::from_millis(self.spin_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueDrainConfig {
    pub lock_key_prefix: String,
    pub lock_ttl_seconds: u64,
}

impl Default for QueueDrainConfig {
    fn default() -> Self {
        Self {
            lock_key_prefix: DRAIN_LOCK_PREFIX.to_string(),
            lock_ttl_seconds: defaults::DRAIN_LOCK_TTL_SECONDS,
        }
    }
}

impl QueueDrainConfig {
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StopTaskConfig {
    pub lock_key_prefix: String,
    pub lock_ttl_seconds: u64,
    /// Upper bound on topic groups interrupted in parallel
    pub max_concurrent_topics: usize,
}

impl Default for StopTaskConfig {
    fn default() -> Self {
        Self {
            lock_key_prefix: STOP_LOCK_PREFIX.to_string(),
            lock_ttl_seconds: defaults::STOP_LOCK_TTL_SECONDS,
            max_concurrent_topics: defaults::MAX_CONCURRENT_TOPICS,
        }
    }
}

impl StopTaskConfig {
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub event_name: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            event_name: SUMMARY_TASK_COMPLETED_EVENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    pub worker_count: usize,
    pub channel_capacity: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            worker_count: defaults::CONSUMER_WORKERS,
            channel_capacity: defaults::CONSUMER_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Explicit filter directive; falls back to the environment default
    pub level: Option<String>,
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CoordinatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.queue_drain.lock_key_prefix, "drain");
        assert_eq!(config.stop_task.lock_key_prefix, "stop");
        assert_eq!(config.lock.backend, LockBackendKind::Memory);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = CoordinatorConfig::default();
        config.queue_drain.lock_ttl_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("queue_drain.lock_ttl_seconds"));
    }

    #[test]
    fn test_spin_interval_longer_than_timeout_rejected() {
        let mut config = CoordinatorConfig::default();
        config.lock.spin_timeout_ms = 50;
        config.lock.spin_interval_ms = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redis_backend_requires_url() {
        let mut config = CoordinatorConfig::default();
        config.lock.backend = LockBackendKind::Redis;
        config.lock.redis.url = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn test_duration_helpers() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.queue_drain.lock_ttl(), Duration::from_secs(60));
        assert_eq!(config.lock.spin_interval(), Duration::from_millis(100));
    }
}
