//! Redis lock store
//!
//! Uses `redis::aio::ConnectionManager` for async multiplexed connections.
//! Acquire is `SET key owner NX PX ttl`; release and extend run as Lua
//! scripts so the owner comparison and the mutation are atomic.
//! Requires the `lock-redis` feature flag.

use std::time::Duration;
use tracing::debug;

use crate::config::RedisConfig;
use crate::locking::errors::{LockError, LockResult};
use crate::locking::traits::LockStore;

const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

const EXTEND_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("PEXPIRE", KEYS[1], ARGV[2])
else
    return 0
end
"#;

#[derive(Clone)]
pub struct RedisLockStore {
    connection_manager: redis::aio::ConnectionManager,
    release_script: redis::Script,
    extend_script: redis::Script,
}

impl std::fmt::Debug for RedisLockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisLockStore")
            .field("connection_manager", &"ConnectionManager")
            .finish()
    }
}

impl RedisLockStore {
    pub async fn from_config(config: &RedisConfig) -> LockResult<Self> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            LockError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let connection_manager = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| LockError::ConnectionError(format!("Failed to connect to Redis: {}", e)))?;

        debug!(url = %redact_url(&config.url), "Redis lock store connected");

        Ok(Self {
            connection_manager,
            release_script: redis::Script::new(RELEASE_SCRIPT),
            extend_script: redis::Script::new(EXTEND_SCRIPT),
        })
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

impl LockStore for RedisLockStore {
    async fn try_acquire(&self, key: &str, owner: &str, ttl: Duration) -> LockResult<bool> {
        let mut conn = self.connection_manager.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(owner)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| LockError::BackendError(format!("Redis SET NX failed: {}", e)))?;

        Ok(reply.is_some())
    }

    async fn release(&self, key: &str, owner: &str) -> LockResult<bool> {
        let mut conn = self.connection_manager.clone();
        let deleted: i64 = self
            .release_script
            .key(key)
            .arg(owner)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| LockError::BackendError(format!("Redis release script failed: {}", e)))?;

        Ok(deleted == 1)
    }

    async fn extend(&self, key: &str, owner: &str, ttl: Duration) -> LockResult<bool> {
        let mut conn = self.connection_manager.clone();
        let extended: i64 = self
            .extend_script
            .key(key)
            .arg(owner)
            .arg(ttl_millis(ttl))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| LockError::BackendError(format!("Redis extend script failed: {}", e)))?;

        Ok(extended == 1)
    }

    async fn owner(&self, key: &str) -> LockResult<Option<String>> {
        let mut conn = self.connection_manager.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| LockError::BackendError(format!("Redis GET failed: {}", e)))
    }

    async fn health_check(&self) -> LockResult<bool> {
        let mut conn = self.connection_manager.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| LockError::BackendError(format!("Redis PING failed: {}", e)))?;

        Ok(pong == "PONG")
    }

    fn provider_name(&self) -> &'static str {
        "redis"
    }
}

/// Redact credentials from a Redis URL for logging
fn redact_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let prefix = &url[..=colon_pos];
            let suffix = &url[at_pos..];
            return format!("{}***{}", prefix, suffix);
        }
    }
    url.to_string()
}
