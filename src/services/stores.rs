//! Read-only views of the task, topic and message stores

use async_trait::async_trait;

use super::errors::CollaboratorResult;
use crate::models::{Task, Topic, TopicFilter, TopicMessage};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Non-terminal tasks under one topic
    async fn list_running_tasks_by_topic(&self, topic_id: i64) -> CollaboratorResult<Vec<Task>>;

    /// Non-terminal tasks under any of `topic_ids`.
    ///
    /// The default issues one lookup per topic; stores with a batch query
    /// should override it.
    async fn list_running_tasks_by_topics(&self, topic_ids: &[i64]) -> CollaboratorResult<Vec<Task>> {
        let mut tasks = Vec::new();
        for topic_id in topic_ids {
            tasks.extend(self.list_running_tasks_by_topic(*topic_id).await?);
        }
        Ok(tasks)
    }
}

#[async_trait]
pub trait TopicRepository: Send + Sync {
    async fn find_topic(&self, topic_id: i64) -> CollaboratorResult<Option<Topic>>;

    /// Live and soft-deleted topics matching `filter`. Deletion does not mean
    /// a topic has no running tasks left.
    async fn list_topics_including_deleted(&self, filter: TopicFilter) -> CollaboratorResult<Vec<Topic>>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Messages of `(topic_id, task_id)` sent by the user, not the agent
    async fn list_user_messages(&self, topic_id: i64, task_id: i64) -> CollaboratorResult<Vec<TopicMessage>>;
}
