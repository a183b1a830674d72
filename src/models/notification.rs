//! Payload pushed to the user when a summary task ends. Built per push,
//! never stored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub workspace_id: i64,
    pub workspace_name: String,
    pub project_id: i64,
    pub project_name: String,
    pub topic_id: i64,
    pub organization_code: String,
    pub success: bool,
    /// Unix seconds
    pub timestamp: i64,
}
