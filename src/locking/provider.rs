//! Lock provider
//!
//! Enum dispatch over the concrete stores, so the lock service holds one
//! concrete type without a vtable.

use std::time::Duration;
use tracing::info;

use super::errors::{LockError, LockResult};
use super::providers::InMemoryLockStore;
use super::traits::LockStore;
use crate::config::{LockBackendKind, LockConfig};

#[cfg(feature = "lock-redis")]
use super::providers::RedisLockStore;

#[derive(Debug, Clone)]
enum LockBackend {
    /// Redis lock store (boxed to reduce enum size)
    #[cfg(feature = "lock-redis")]
    Redis(Box<RedisLockStore>),

    Memory(InMemoryLockStore),
}

#[derive(Debug, Clone)]
pub struct LockProvider {
    backend: LockBackend,
}

impl LockProvider {
    pub fn memory(store: InMemoryLockStore) -> Self {
        Self {
            backend: LockBackend::Memory(store),
        }
    }

    #[cfg(feature = "lock-redis")]
    pub fn redis(store: RedisLockStore) -> Self {
        Self {
            backend: LockBackend::Redis(Box::new(store)),
        }
    }

    /// Build the configured backend.
    ///
    /// There is no fallback from Redis to memory: a process-local lock would
    /// silently drop mutual exclusion across instances.
    pub async fn from_config(config: &LockConfig) -> LockResult<Self> {
        let provider = match config.backend {
            LockBackendKind::Memory => Self::memory(InMemoryLockStore::new()),
            #[cfg(feature = "lock-redis")]
            LockBackendKind::Redis => Self::redis(RedisLockStore::from_config(&config.redis).await?),
            #[cfg(not(feature = "lock-redis"))]
            LockBackendKind::Redis => {
                return Err(LockError::Configuration(
                    "redis lock backend requested but the `lock-redis` feature is disabled".to_string(),
                ))
            }
        };

        info!(provider = provider.provider_name(), "Lock provider initialized");
        Ok(provider)
    }
}

impl LockStore for LockProvider {
    async fn try_acquire(&self, key: &str, owner: &str, ttl: Duration) -> LockResult<bool> {
        match &self.backend {
            #[cfg(feature = "lock-redis")]
            LockBackend::Redis(s) => s.try_acquire(key, owner, ttl).await,
            LockBackend::Memory(s) => s.try_acquire(key, owner, ttl).await,
        }
    }

    async fn release(&self, key: &str, owner: &str) -> LockResult<bool> {
        match &self.backend {
            #[cfg(feature = "lock-redis")]
            LockBackend::Redis(s) => s.release(key, owner).await,
            LockBackend::Memory(s) => s.release(key, owner).await,
        }
    }

    async fn extend(&self, key: &str, owner: &str, ttl: Duration) -> LockResult<bool> {
        match &self.backend {
            #[cfg(feature = "lock-redis")]
            LockBackend::Redis(s) => s.extend(key, owner, ttl).await,
            LockBackend::Memory(s) => s.extend(key, owner, ttl).await,
        }
    }

    async fn owner(&self, key: &str) -> LockResult<Option<String>> {
        match &self.backend {
            #[cfg(feature = "lock-redis")]
            LockBackend::Redis(s) => s.owner(key).await,
            LockBackend::Memory(s) => s.owner(key).await,
        }
    }

    async fn health_check(&self) -> LockResult<bool> {
        match &self.backend {
            #[cfg(feature = "lock-redis")]
            LockBackend::Redis(s) => s.health_check().await,
            LockBackend::Memory(s) => s.health_check().await,
        }
    }

    fn provider_name(&self) -> &'static str {
        match &self.backend {
            #[cfg(feature = "lock-redis")]
            LockBackend::Redis(s) => s.provider_name(),
            LockBackend::Memory(s) => s.provider_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_from_default_config() {
        let provider = LockProvider::from_config(&LockConfig::default()).await.unwrap();
        assert_eq!(provider.provider_name(), "memory");
        assert!(provider.health_check().await.unwrap());
    }

    #[cfg(not(feature = "lock-redis"))]
    #[tokio::test]
    async fn test_redis_backend_without_feature_is_rejected() {
        let config = LockConfig {
            backend: LockBackendKind::Redis,
            ..LockConfig::default()
        };
        let err = LockProvider::from_config(&config).await.unwrap_err();
        assert!(matches!(err, LockError::Configuration(_)));
    }
}
