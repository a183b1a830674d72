//! Record builders with the fields tests usually don't care about filled in.

use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::models::{SenderType, Task, TaskStatus, Topic, TopicMessage, TopicMode};

static NEXT_MESSAGE_ID: AtomicI64 = AtomicI64::new(1);

/// Running task with sandbox id `sbx-<id>`
pub fn running_task(id: i64, topic_id: i64) -> Task {
    Task {
        id,
        topic_id,
        sandbox_id: format!("sbx-{id}"),
        status: TaskStatus::Running,
        payload: Value::Null,
    }
}

/// Live general-mode topic
pub fn topic(id: i64, project_id: i64, workspace_id: i64) -> Topic {
    Topic {
        id,
        project_id,
        workspace_id,
        mode: TopicMode::General,
        deleted_at: None,
    }
}

pub fn summary_topic(id: i64, project_id: i64, workspace_id: i64) -> Topic {
    Topic {
        mode: TopicMode::Summary,
        ..topic(id, project_id, workspace_id)
    }
}

pub fn user_message(topic_id: i64, task_id: i64, raw_content: Value) -> TopicMessage {
    message(topic_id, task_id, SenderType::User, raw_content)
}

pub fn agent_message(topic_id: i64, task_id: i64, raw_content: Value) -> TopicMessage {
    message(topic_id, task_id, SenderType::Agent, raw_content)
}

fn message(topic_id: i64, task_id: i64, sender: SenderType, raw_content: Value) -> TopicMessage {
    TopicMessage {
        id: NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed),
        topic_id,
        task_id,
        sender,
        raw_content,
    }
}
