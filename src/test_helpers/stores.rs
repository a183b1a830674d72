//! In-memory task, topic and message stores

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::models::{Task, Topic, TopicFilter, TopicMessage};
use crate::services::{CollaboratorError, CollaboratorResult, MessageRepository, TaskStore, TopicRepository};

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<BTreeMap<i64, Task>>,
    unavailable: AtomicBool,
    batch_lookups: AtomicUsize,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, task: Task) {
        self.tasks.write().insert(task.id, task);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// How many times the batch lookup was used
    pub fn batch_lookups(&self) -> usize {
        self.batch_lookups.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> CollaboratorResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CollaboratorError::unavailable("task_store", "marked unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_running_tasks_by_topic(&self, topic_id: i64) -> CollaboratorResult<Vec<Task>> {
        self.ensure_available()?;
        Ok(self
            .tasks
            .read()
            .values()
            .filter(|t| t.topic_id == topic_id && t.is_running())
            .cloned()
            .collect())
    }

    async fn list_running_tasks_by_topics(&self, topic_ids: &[i64]) -> CollaboratorResult<Vec<Task>> {
        self.ensure_available()?;
        self.batch_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .tasks
            .read()
            .values()
            .filter(|t| topic_ids.contains(&t.topic_id) && t.is_running())
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTopicRepository {
    topics: RwLock<BTreeMap<i64, Topic>>,
    unavailable: AtomicBool,
}

impl InMemoryTopicRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, topic: Topic) {
        self.topics.write().insert(topic.id, topic);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> CollaboratorResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CollaboratorError::unavailable("topic_repository", "marked unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl TopicRepository for InMemoryTopicRepository {
    async fn find_topic(&self, topic_id: i64) -> CollaboratorResult<Option<Topic>> {
        self.ensure_available()?;
        Ok(self.topics.read().get(&topic_id).cloned())
    }

    async fn list_topics_including_deleted(&self, filter: TopicFilter) -> CollaboratorResult<Vec<Topic>> {
        self.ensure_available()?;
        Ok(self
            .topics
            .read()
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    messages: RwLock<Vec<TopicMessage>>,
    unavailable: AtomicBool,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, message: TopicMessage) {
        self.messages.write().push(message);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn list_user_messages(&self, topic_id: i64, task_id: i64) -> CollaboratorResult<Vec<TopicMessage>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CollaboratorError::unavailable("message_repository", "marked unavailable"));
        }
        Ok(self
            .messages
            .read()
            .iter()
            .filter(|m| m.topic_id == topic_id && m.task_id == task_id && m.is_from_user())
            .cloned()
            .collect())
    }
}
