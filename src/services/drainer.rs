use async_trait::async_trait;

use super::errors::CollaboratorResult;

/// Batch drain of a topic's pending message queue
#[async_trait]
pub trait QueueDrainer: Send + Sync {
    /// Process every message pending for `topic_id` in arrival order and
    /// return how many were processed. An empty queue returns `Ok(0)`.
    async fn drain_pending(&self, topic_id: i64) -> CollaboratorResult<u64>;
}
