//! Lock store trait definition

use super::errors::LockResult;
use std::time::Duration;

/// Primitive operations of a shared key-value store used for mutual exclusion.
///
/// Every mutating operation is owner-checked: a caller can only release or
/// extend a lock whose stored owner token equals its own. Expiry is the
/// safety net for crashed holders.
pub trait LockStore: Send + Sync {
    /// Set `key` to `owner` with a TTL only if no live lock exists.
    ///
    /// Returns `Ok(true)` when this call took the lock.
    fn try_acquire(
        &self,
        key: &str,
        owner: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = LockResult<bool>> + Send;

    /// Delete `key` only if it is currently held by `owner`
    fn release(
        &self,
        key: &str,
        owner: &str,
    ) -> impl std::future::Future<Output = LockResult<bool>> + Send;

    /// Reset the TTL of `key` only if it is currently held by `owner`
    fn extend(
        &self,
        key: &str,
        owner: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = LockResult<bool>> + Send;

    /// Owner token of the live lock on `key`, if any
    fn owner(&self, key: &str)
        -> impl std::future::Future<Output = LockResult<Option<String>>> + Send;

    /// Check if the store is reachable
    fn health_check(&self) -> impl std::future::Future<Output = LockResult<bool>> + Send;

    /// Get the name of the lock store provider
    fn provider_name(&self) -> &'static str;
}
