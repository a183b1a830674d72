//! Shared constants for lock keys, payload markers and notification events.

/// Lock key prefix for per-topic queue draining (`drain:<topic_id>`).
pub const DRAIN_LOCK_PREFIX: &str = "drain";

/// Lock key prefix for per-topic stop orchestration (`stop:<topic_id>`).
pub const STOP_LOCK_PREFIX: &str = "stop";

/// Raw-payload key that marks a user message as the origin of a summary task.
pub const SUMMARY_TASK_MARKER: &str = "summary_task";

/// Realtime event name pushed when a summary task reaches a terminal status.
pub const SUMMARY_TASK_COMPLETED_EVENT: &str = "summary_task_completed";

/// Interrupt reason sent to sandboxes when a stop request carries none.
pub const DEFAULT_STOP_REASON: &str = "task stopped by user";

pub mod defaults {
    /// Covers a full batch drain of a topic queue.
    pub const DRAIN_LOCK_TTL_SECONDS: u64 = 60;
    pub const STOP_LOCK_TTL_SECONDS: u64 = 60;
    pub const SPIN_TIMEOUT_MS: u64 = 3_000;
    pub const SPIN_INTERVAL_MS: u64 = 100;
    pub const MAX_CONCURRENT_TOPICS: usize = 8;
    pub const CONSUMER_WORKERS: usize = 4;
    pub const CONSUMER_CHANNEL_CAPACITY: usize = 1024;
}

/// Build a topic-scoped lock key.
pub fn topic_lock_key(prefix: &str, topic_id: i64) -> String {
    format!("{prefix}:{topic_id}")
}
