//! # Distributed Locking
//!
//! Short-lived, owner-checked locks over a shared coordination store.
//!
//! ```text
//! LockService                 <- acquire (spin | mutex), release, extend
//!   └── LockProvider (enum)   <- zero-cost dispatch, no vtable
//!         ├── Redis(RedisLockStore)      <- SET NX PX + Lua compare-and-delete
//!         └── Memory(InMemoryLockStore)  <- DashMap, single process / tests
//! ```
//!
//! Lock keys are topic scoped (`drain:<topic_id>`, `stop:<topic_id>`) and are
//! the only mutable state this crate shares between workers.

pub mod errors;
pub mod provider;
pub mod providers;
pub mod service;
pub mod traits;

pub use errors::{LockError, LockResult};
pub use provider::LockProvider;
pub use providers::InMemoryLockStore;
pub use service::{Exclusive, LockMode, LockService};
pub use traits::LockStore;

#[cfg(feature = "lock-redis")]
pub use providers::RedisLockStore;
