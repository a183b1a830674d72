//! # Stop Scope Resolution
//!
//! Turns a `(scope_type, scope_id)` pair into the running tasks it covers and
//! groups them by topic, the unit stop orchestration locks on.
//!
//! Project and workspace scopes resolve through
//! [`TopicRepository::list_topics_including_deleted`]: a topic soft-deleted
//! while one of its tasks was still running must still have that task stopped.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::models::{ScopeType, StopScope, Task, TopicFilter};
use crate::services::{CollaboratorResult, TaskStore, TopicRepository};

#[derive(Clone)]
pub struct ScopeResolver {
    tasks: Arc<dyn TaskStore>,
    topics: Arc<dyn TopicRepository>,
}

impl std::fmt::Debug for ScopeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeResolver").finish_non_exhaustive()
    }
}

impl ScopeResolver {
    pub fn new(tasks: Arc<dyn TaskStore>, topics: Arc<dyn TopicRepository>) -> Self {
        Self { tasks, topics }
    }

    /// Running tasks covered by `scope`
    pub async fn list_running_tasks_by_scope(&self, scope: StopScope) -> CollaboratorResult<Vec<Task>> {
        let filter = match scope.scope_type {
            ScopeType::Topic => {
                return self.tasks.list_running_tasks_by_topic(scope.scope_id).await;
            }
            ScopeType::Project => TopicFilter::Project(scope.scope_id),
            ScopeType::Workspace => TopicFilter::Workspace(scope.scope_id),
        };

        let topics = self.topics.list_topics_including_deleted(filter).await?;
        if topics.is_empty() {
            return Ok(Vec::new());
        }

        let deleted = topics.iter().filter(|t| t.is_deleted()).count();
        let topic_ids: Vec<i64> = topics.iter().map(|t| t.id).collect();
        debug!(
            scope_type = %scope.scope_type,
            scope_id = scope.scope_id,
            topic_count = topic_ids.len(),
            deleted_topics = deleted,
            "Resolved scope topics"
        );

        self.tasks.list_running_tasks_by_topics(&topic_ids).await
    }
}

/// Group tasks by topic, ordered by topic id. A task listed twice is kept once.
pub fn group_by_topic(tasks: Vec<Task>) -> BTreeMap<i64, Vec<Task>> {
    let mut seen = HashSet::new();
    let mut groups: BTreeMap<i64, Vec<Task>> = BTreeMap::new();
    for task in tasks {
        if seen.insert(task.id) {
            groups.entry(task.topic_id).or_default().push(task);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use crate::test_helpers::{running_task, topic, InMemoryTaskStore, InMemoryTopicRepository};
    use chrono::Utc;
    use proptest::prelude::*;

    fn resolver(tasks: InMemoryTaskStore, topics: InMemoryTopicRepository) -> ScopeResolver {
        ScopeResolver::new(Arc::new(tasks), Arc::new(topics))
    }

    #[tokio::test]
    async fn test_project_scope_includes_soft_deleted_topics() {
        let topics = InMemoryTopicRepository::new();
        topics.insert(topic(1, 10, 100));
        let mut deleted = topic(2, 10, 100);
        deleted.deleted_at = Some(Utc::now());
        topics.insert(deleted);
        topics.insert(topic(3, 11, 100));

        let tasks = InMemoryTaskStore::new();
        tasks.insert(running_task(101, 1));
        tasks.insert(running_task(102, 2));
        tasks.insert(running_task(103, 3));

        let found = resolver(tasks, topics)
            .list_running_tasks_by_scope(StopScope {
                scope_type: ScopeType::Project,
                scope_id: 10,
            })
            .await
            .unwrap();

        let mut ids: Vec<i64> = found.iter().map(|t| t.id).collect();
        ids.sort();
        assert_eq!(ids, vec![101, 102]);
    }

    #[tokio::test]
    async fn test_workspace_scope_spans_projects() {
        let topics = InMemoryTopicRepository::new();
        topics.insert(topic(1, 10, 100));
        topics.insert(topic(2, 11, 100));
        topics.insert(topic(3, 12, 200));

        let tasks = InMemoryTaskStore::new();
        tasks.insert(running_task(1, 1));
        tasks.insert(running_task(2, 2));
        tasks.insert(running_task(3, 3));

        let found = resolver(tasks, topics)
            .list_running_tasks_by_scope(StopScope {
                scope_type: ScopeType::Workspace,
                scope_id: 100,
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_topic_scope_skips_terminal_tasks() {
        let tasks = InMemoryTaskStore::new();
        tasks.insert(running_task(1, 7));
        let mut finished = running_task(2, 7);
        finished.status = TaskStatus::Finished;
        tasks.insert(finished);

        let found = resolver(tasks, InMemoryTopicRepository::new())
            .list_running_tasks_by_scope(StopScope {
                scope_type: ScopeType::Topic,
                scope_id: 7,
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[tokio::test]
    async fn test_unknown_project_resolves_to_nothing() {
        let found = resolver(InMemoryTaskStore::new(), InMemoryTopicRepository::new())
            .list_running_tasks_by_scope(StopScope {
                scope_type: ScopeType::Project,
                scope_id: 404,
            })
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_group_by_topic_dedupes_tasks() {
        let groups = group_by_topic(vec![
            running_task(1, 5),
            running_task(2, 6),
            running_task(1, 5),
            running_task(3, 5),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&5].len(), 2);
        assert_eq!(groups[&6].len(), 1);
    }

    proptest! {
        #[test]
        fn prop_grouping_partitions_distinct_tasks(
            pairs in prop::collection::vec((1i64..50, 1i64..6), 0..40)
        ) {
            let tasks: Vec<Task> = pairs.iter().map(|(id, topic_id)| running_task(*id, *topic_id)).collect();
            let distinct: HashSet<i64> = pairs.iter().map(|(id, _)| *id).collect();

            let groups = group_by_topic(tasks);

            let grouped: usize = groups.values().map(Vec::len).sum();
            prop_assert_eq!(grouped, distinct.len());
            for (topic_id, group) in &groups {
                prop_assert!(!group.is_empty());
                prop_assert!(group.iter().all(|t| t.topic_id == *topic_id));
            }
        }
    }
}
