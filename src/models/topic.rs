//! # Topic Model
//!
//! A conversation sub-unit under a project and workspace. Used purely as the
//! grouping and locking unit. Soft-deleted topics keep their rows
//! (`deleted_at` set) and must still be found by stop scope resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub project_id: i64,
    pub workspace_id: i64,
    pub mode: TopicMode,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Topic {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicMode {
    #[default]
    General,
    Chat,
    Summary,
    #[serde(other)]
    Other,
}

/// Selects topics by owning container. Always matches tombstoned rows too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicFilter {
    Project(i64),
    Workspace(i64),
}

impl TopicFilter {
    pub fn matches(&self, topic: &Topic) -> bool {
        match self {
            TopicFilter::Project(id) => topic.project_id == *id,
            TopicFilter::Workspace(id) => topic.workspace_id == *id,
        }
    }
}
