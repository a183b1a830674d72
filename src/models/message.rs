//! Topic message records, read to detect the summary-task marker.

use serde::{Deserialize, Serialize};

use crate::constants::SUMMARY_TASK_MARKER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMessage {
    pub id: i64,
    pub topic_id: i64,
    pub task_id: i64,
    pub sender: SenderType,
    /// Raw payload as stored by the chat layer
    #[serde(default)]
    pub raw_content: serde_json::Value,
}

impl TopicMessage {
    pub fn is_from_user(&self) -> bool {
        self.sender == SenderType::User
    }

    /// True when the raw payload carries `summary_task: true`.
    pub fn has_summary_marker(&self) -> bool {
        self.raw_content
            .get(SUMMARY_TASK_MARKER)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}
