//! User, project and workspace lookups used to address and label notifications

use async_trait::async_trait;

use super::errors::CollaboratorResult;

#[async_trait]
pub trait Directory: Send + Sync {
    /// Realtime routing identity of a domain user
    async fn resolve_routing_id(&self, user_id: &str, organization_code: &str) -> CollaboratorResult<String>;

    async fn project_name(&self, project_id: i64) -> CollaboratorResult<String>;

    async fn workspace_name(&self, workspace_id: i64) -> CollaboratorResult<String>;
}
