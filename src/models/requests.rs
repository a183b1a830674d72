//! # Inbound Message Shapes
//!
//! The three payloads the coordinator accepts. Fields are lenient on the wire
//! (missing values default) and checked by `validate()`, so a malformed
//! message is classified and acknowledged instead of failing to decode.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::task::TaskStatus;

/// Cue that a topic's pending queue may have work. Not itself a queued item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueueDrainTrigger {
    pub topic_id: i64,
    pub task_id: i64,
}

impl QueueDrainTrigger {
    pub fn new(topic_id: i64, task_id: i64) -> Self {
        Self { topic_id, task_id }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.topic_id <= 0 {
            return Err(format!("topicId must be positive, got {}", self.topic_id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    Workspace,
    Project,
    Topic,
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeType::Workspace => write!(f, "workspace"),
            ScopeType::Project => write!(f, "project"),
            ScopeType::Topic => write!(f, "topic"),
        }
    }
}

/// Operator request to interrupt every running task in a scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopRequest {
    pub event_id: String,
    pub scope_type: Option<ScopeType>,
    pub scope_id: i64,
    pub user_id: String,
    pub organization_code: String,
    pub reason: String,
}

/// Scope extracted from a validated stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopScope {
    pub scope_type: ScopeType,
    pub scope_id: i64,
}

impl StopRequest {
    /// Check every required field and return the scope to resolve.
    /// The error lists all missing fields at once.
    pub fn validate(&self) -> Result<StopScope, String> {
        let mut missing = Vec::new();
        if self.event_id.trim().is_empty() {
            missing.push("eventId");
        }
        if self.scope_type.is_none() {
            missing.push("scopeType");
        }
        if self.scope_id <= 0 {
            missing.push("scopeId");
        }
        if self.user_id.trim().is_empty() {
            missing.push("userId");
        }
        if self.organization_code.trim().is_empty() {
            missing.push("organizationCode");
        }

        match self.scope_type {
            Some(scope_type) if missing.is_empty() => Ok(StopScope {
                scope_type,
                scope_id: self.scope_id,
            }),
            _ => Err(format!("missing required fields: {}", missing.join(", "))),
        }
    }
}

/// Task lifecycle callback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskCallback {
    pub task_id: i64,
    pub topic_id: i64,
    pub user_id: String,
    pub organization_code: String,
    /// Kept as text; producers send statuses this crate does not model
    pub status: String,
}

impl TaskCallback {
    /// Parsed status when it is `Finished` or `Error`
    pub fn terminal_status(&self) -> Option<TaskStatus> {
        self.status
            .parse::<TaskStatus>()
            .ok()
            .filter(TaskStatus::is_terminal)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut missing = Vec::new();
        if self.task_id <= 0 {
            missing.push("taskId");
        }
        if self.topic_id <= 0 {
            missing.push("topicId");
        }
        if self.user_id.trim().is_empty() {
            missing.push("userId");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("missing required fields: {}", missing.join(", ")))
        }
    }
}
