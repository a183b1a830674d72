use async_trait::async_trait;

use super::errors::CollaboratorResult;

/// Outbound realtime push. Fire-and-forget: no delivery confirmation.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    async fn push(&self, routing_id: &str, event: &str, payload: serde_json::Value) -> CollaboratorResult<()>;
}
