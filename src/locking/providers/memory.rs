//! In-process lock store
//!
//! `DashMap`-backed store for single-instance deployments and tests. TTLs are
//! measured with `tokio::time::Instant`, so paused-clock tests can advance
//! past an expiry. Clones share the same key space.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::locking::errors::{LockError, LockResult};
use crate::locking::traits::LockStore;

#[derive(Debug, Clone)]
struct LockEntry {
    owner: String,
    expires_at: Instant,
}

impl LockEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryLockStore {
    entries: Arc<DashMap<String, LockEntry>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store going away: every call fails until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of keys with a live lock
    pub fn live_lock_count(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.value().is_live(now)).count()
    }

    fn ensure_available(&self) -> LockResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LockError::ConnectionError(
                "in-memory lock store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl LockStore for InMemoryLockStore {
    async fn try_acquire(&self, key: &str, owner: &str, ttl: Duration) -> LockResult<bool> {
        self.ensure_available()?;
        let now = Instant::now();
        let entry = LockEntry {
            owner: owner.to_string(),
            expires_at: now + ttl,
        };

        let acquired = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    false
                } else {
                    debug!(key = key, "Replacing expired lock");
                    occupied.insert(entry);
                    true
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                true
            }
        };

        Ok(acquired)
    }

    async fn release(&self, key: &str, owner: &str) -> LockResult<bool> {
        self.ensure_available()?;
        let now = Instant::now();
        let removed = self
            .entries
            .remove_if(key, |_, entry| entry.owner == owner && entry.is_live(now))
            .is_some();
        Ok(removed)
    }

    async fn extend(&self, key: &str, owner: &str, ttl: Duration) -> LockResult<bool> {
        self.ensure_available()?;
        let now = Instant::now();
        match self.entries.get_mut(key) {
            Some(mut entry) if entry.owner == owner && entry.is_live(now) => {
                entry.expires_at = now + ttl;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn owner(&self, key: &str) -> LockResult<Option<String>> {
        self.ensure_available()?;
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.owner.clone()))
    }

    async fn health_check(&self) -> LockResult<bool> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
