//! # Task Model
//!
//! A unit of agent work running inside an execution sandbox. Owned by the
//! external task store; the coordinator only reads status and topic grouping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub topic_id: i64,
    pub sandbox_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Task {
    pub fn is_running(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Finished,
    Error,
}

impl TaskStatus {
    /// `Finished` and `Error` end a task; nothing further happens to it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Finished | TaskStatus::Error)
    }

    /// Statuses an interrupt can still affect
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Finished => "finished",
            TaskStatus::Error => "error",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Case-insensitive; callbacks arrive from several producers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "waiting" => Ok(TaskStatus::Pending),
            "running" => Ok(TaskStatus::Running),
            "finished" => Ok(TaskStatus::Finished),
            "error" => Ok(TaskStatus::Error),
            other => Err(format!("unrecognized task status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(TaskStatus::Finished.is_terminal());
        assert!(TaskStatus::Error.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("FINISHED".parse::<TaskStatus>(), Ok(TaskStatus::Finished));
        assert_eq!(" error ".parse::<TaskStatus>(), Ok(TaskStatus::Error));
        assert_eq!("waiting".parse::<TaskStatus>(), Ok(TaskStatus::Pending));
        assert!("suspended".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_deserializes_without_payload() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": 3,
            "topic_id": 11,
            "sandbox_id": "sbx-3",
            "status": "running"
        }))
        .unwrap();
        assert!(task.is_running());
        assert!(task.payload.is_null());
    }
}
