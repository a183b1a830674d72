//! Lock store implementations

pub mod memory;

#[cfg(feature = "lock-redis")]
pub mod redis;

pub use memory::InMemoryLockStore;

#[cfg(feature = "lock-redis")]
pub use self::redis::RedisLockStore;
