use async_trait::async_trait;

use super::errors::CollaboratorResult;

/// Command channel to the sandboxes tasks execute in
#[async_trait]
pub trait SandboxExecutor: Send + Sync {
    async fn send_interrupt(&self, sandbox_id: &str, task_id: i64, reason: &str) -> CollaboratorResult<()>;
}
