//! # Lock Service
//!
//! Thin client over a [`LockStore`] offering the two acquisition modes the
//! handlers need and owner-safe release.
//!
//! ## Failure semantics
//!
//! Store errors never surface to callers. An unreachable store makes
//! `acquire` return `false` ("could not get exclusivity") and `release`
//! return `false`; both are logged. The caller skips its work for this
//! invocation and relies on the next trigger.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//! use topic_coordinator::config::LockConfig;
//! use topic_coordinator::locking::{InMemoryLockStore, LockMode, LockProvider, LockService};
//!
//! # async fn example() {
//! let service = LockService::new(
//!     LockProvider::memory(InMemoryLockStore::new()),
//!     &LockConfig::default(),
//! );
//! let owner = service.new_owner_token();
//!
//! if service.acquire("drain:5", &owner, Duration::from_secs(60), LockMode::Spin).await {
//!     // ... exclusive work ...
//!     service.release("drain:5", &owner).await;
//! }
//! # }
//! ```

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::provider::LockProvider;
use super::traits::LockStore;
use crate::config::LockConfig;
use crate::logging::log_lock_operation;

/// How `acquire` behaves when the lock is already held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Retry for the configured spin window before giving up
    Spin,
    /// Single attempt; fail immediately if held
    Mutex,
}

/// Result of running work under a lock via [`LockService::run_exclusive`]
#[derive(Debug)]
pub enum Exclusive<T> {
    /// The lock was held for the whole run and the work completed
    Ran(T),
    /// The work panicked; the lock was still released
    Panicked(String),
    /// Someone else holds the lock (or the store was unreachable)
    Contended,
}

#[derive(Debug, Clone)]
pub struct LockService {
    provider: Arc<LockProvider>,
    instance_id: String,
    spin_timeout: Duration,
    spin_interval: Duration,
}

impl LockService {
    pub fn new(provider: LockProvider, config: &LockConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            instance_id: config.instance_id.clone(),
            spin_timeout: config.spin_timeout(),
            spin_interval: config.spin_interval(),
        }
    }

    /// Opaque token identifying one lock holder: `<instance-id>:<uuid>`
    pub fn new_owner_token(&self) -> String {
        format!("{}:{}", self.instance_id, Uuid::new_v4())
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Try to take `key` for `owner` with the given TTL.
    #[instrument(skip(self, owner), fields(lock_key = %key))]
    pub async fn acquire(&self, key: &str, owner: &str, ttl: Duration, mode: LockMode) -> bool {
        let deadline = Instant::now() + self.spin_timeout;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match self.provider.try_acquire(key, owner, ttl).await {
                Ok(true) => {
                    log_lock_operation("acquire", key, owner, "acquired");
                    debug!(attempts = attempts, mode = ?mode, "Lock acquired");
                    return true;
                }
                Ok(false) => {
                    if mode == LockMode::Mutex || Instant::now() + self.spin_interval > deadline {
                        log_lock_operation("acquire", key, owner, "contended");
                        debug!(attempts = attempts, mode = ?mode, "Lock held by another owner");
                        return false;
                    }
                    tokio::time::sleep(self.spin_interval).await;
                }
                Err(e) => {
                    warn!(error = %e, attempts = attempts, "Lock store unavailable during acquire");
                    return false;
                }
            }
        }
    }

    /// Release `key` if and only if `owner` holds it
    #[instrument(skip(self, owner), fields(lock_key = %key))]
    pub async fn release(&self, key: &str, owner: &str) -> bool {
        match self.provider.release(key, owner).await {
            Ok(true) => {
                log_lock_operation("release", key, owner, "released");
                true
            }
            Ok(false) => {
                warn!(
                    owner = %owner,
                    "Lock was not released (not owned by this holder, or already expired)"
                );
                false
            }
            Err(e) => {
                warn!(error = %e, "Lock store unavailable during release");
                false
            }
        }
    }

    /// Refresh the TTL of a lock `owner` still holds (heartbeat)
    pub async fn extend(&self, key: &str, owner: &str, ttl: Duration) -> bool {
        match self.provider.extend(key, owner, ttl).await {
            Ok(extended) => {
                log_lock_operation(
                    "extend",
                    key,
                    owner,
                    if extended { "extended" } else { "not_owned" },
                );
                extended
            }
            Err(e) => {
                warn!(lock_key = %key, error = %e, "Lock store unavailable during extend");
                false
            }
        }
    }

    /// Current holder of `key`, `None` when free or the store is unreachable
    pub async fn current_owner(&self, key: &str) -> Option<String> {
        self.provider.owner(key).await.unwrap_or_else(|e| {
            warn!(lock_key = %key, error = %e, "Lock store unavailable during owner lookup");
            None
        })
    }

    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await.unwrap_or(false)
    }

    /// Acquire `key`, run `work`, and release the lock whatever happens to
    /// the work, including a panic.
    pub async fn run_exclusive<F, T>(&self, key: &str, ttl: Duration, mode: LockMode, work: F) -> Exclusive<T>
    where
        F: Future<Output = T> + Send,
    {
        let owner = self.new_owner_token();
        if !self.acquire(key, &owner, ttl, mode).await {
            return Exclusive::Contended;
        }

        let result = AssertUnwindSafe(work).catch_unwind().await;
        self.release(key, &owner).await;

        match result {
            Ok(value) => Exclusive::Ran(value),
            Err(panic) => Exclusive::Panicked(panic_message(panic.as_ref())),
        }
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
