//! # Stop-Task Orchestrator
//!
//! Interrupts every running task in a workspace, project or topic.
//!
//! ## Flow
//!
//! 1. Validate the request. Missing fields are rejected, never retried.
//! 2. Resolve the scope to running tasks (soft-deleted topics included).
//! 3. Group the tasks by topic.
//! 4. Per topic group, concurrently up to `max_concurrent_topics`:
//!    take `stop:<topic_id>` in mutex mode, skip the group if it is held,
//!    interrupt each task in turn, release the lock.
//! 5. Aggregate into a [`StopSummary`] and classify it.
//!
//! Locking per topic rather than per request keeps unrelated topics of a
//! large scope in parallel while preventing two interrupt storms on the same
//! topic. One task's interrupt failing never stops its siblings.

use async_trait::async_trait;
use futures::{stream, FutureExt, StreamExt};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::outcome::{HandlerOutcome, InterruptFailure, SkipReason, StopSummary, TopicStopResult};
use super::scope::{group_by_topic, ScopeResolver};
use crate::config::StopTaskConfig;
use crate::constants::{topic_lock_key, DEFAULT_STOP_REASON};
use crate::locking::service::panic_message;
use crate::locking::{Exclusive, LockMode, LockService};
use crate::messaging::{InboundMessage, MessageHandler, MessageType};
use crate::models::{StopRequest, Task};
use crate::services::SandboxExecutor;

pub struct StopTaskOrchestrator {
    lock_service: LockService,
    resolver: ScopeResolver,
    sandbox: Arc<dyn SandboxExecutor>,
    config: StopTaskConfig,
}

impl StopTaskOrchestrator {
    pub fn new(
        lock_service: LockService,
        resolver: ScopeResolver,
        sandbox: Arc<dyn SandboxExecutor>,
        config: StopTaskConfig,
    ) -> Self {
        Self {
            lock_service,
            resolver,
            sandbox,
            config,
        }
    }

    pub fn lock_key(&self, topic_id: i64) -> String {
        topic_lock_key(&self.config.lock_key_prefix, topic_id)
    }

    #[instrument(
        skip(self, request),
        fields(
            event_id = %request.event_id,
            scope_type = ?request.scope_type,
            scope_id = request.scope_id
        )
    )]
    pub async fn handle(&self, request: &StopRequest) -> HandlerOutcome {
        let scope = match request.validate() {
            Ok(scope) => scope,
            Err(reason) => return HandlerOutcome::Rejected(reason),
        };

        let tasks = match self.resolver.list_running_tasks_by_scope(scope).await {
            Ok(tasks) => tasks,
            Err(e) => {
                return HandlerOutcome::Fatal(format!(
                    "failed to resolve running tasks for {} {}: {e}",
                    scope.scope_type, scope.scope_id
                ))
            }
        };

        if tasks.is_empty() {
            info!("No running tasks in scope");
            return HandlerOutcome::Skipped(SkipReason::NoRunningTasks);
        }

        let groups = group_by_topic(tasks);
        let reason = match request.reason.trim() {
            "" => DEFAULT_STOP_REASON,
            reason => reason,
        };

        debug!(topic_groups = groups.len(), "Stopping tasks per topic");

        let results: Vec<TopicStopResult> = stream::iter(groups)
            .map(|(topic_id, tasks)| self.stop_topic(topic_id, tasks, reason))
            .buffer_unordered(self.config.max_concurrent_topics.max(1))
            .collect()
            .await;

        let summary = StopSummary::from_results(results);
        info!(
            total_tasks = summary.total_tasks,
            succeeded = summary.succeeded,
            failed = summary.failed,
            processed_topics = summary.processed_topics,
            skipped_topics = summary.skipped_topics,
            "Stop request processed"
        );
        summary.into_outcome()
    }

    async fn stop_topic(&self, topic_id: i64, tasks: Vec<Task>, reason: &str) -> TopicStopResult {
        let key = self.lock_key(topic_id);
        let work = self.interrupt_group(topic_id, &tasks, reason);

        match self
            .lock_service
            .run_exclusive(&key, self.config.lock_ttl(), LockMode::Mutex, work)
            .await
        {
            Exclusive::Ran(result) => result,
            Exclusive::Panicked(message) => TopicStopResult::Processed {
                topic_id,
                succeeded: 0,
                failures: tasks
                    .iter()
                    .map(|task| InterruptFailure {
                        task_id: task.id,
                        topic_id,
                        error: format!("topic group panicked: {message}"),
                    })
                    .collect(),
            },
            Exclusive::Contended => {
                info!(
                    topic_id = topic_id,
                    lock_key = %key,
                    tasks = tasks.len(),
                    "Stop already in progress for topic, skipping group"
                );
                TopicStopResult::Skipped {
                    topic_id,
                    task_count: tasks.len(),
                }
            }
        }
    }

    /// Interrupt each task in order. Runs under the topic's stop lock.
    async fn interrupt_group(&self, topic_id: i64, tasks: &[Task], reason: &str) -> TopicStopResult {
        let mut succeeded = 0;
        let mut failures = Vec::new();

        for task in tasks {
            let interrupt = self.sandbox.send_interrupt(&task.sandbox_id, task.id, reason);
            let error = match AssertUnwindSafe(interrupt).catch_unwind().await {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(panic) => Some(format!("interrupt panicked: {}", panic_message(panic.as_ref()))),
            };

            match error {
                None => {
                    debug!(task_id = task.id, sandbox_id = %task.sandbox_id, "Task interrupted");
                    succeeded += 1;
                }
                Some(error) => {
                    warn!(
                        task_id = task.id,
                        topic_id = topic_id,
                        sandbox_id = %task.sandbox_id,
                        error = %error,
                        "Failed to interrupt task"
                    );
                    failures.push(InterruptFailure {
                        task_id: task.id,
                        topic_id,
                        error,
                    });
                }
            }
        }

        TopicStopResult::Processed {
            topic_id,
            succeeded,
            failures,
        }
    }
}

#[async_trait]
impl MessageHandler for StopTaskOrchestrator {
    fn handler_name(&self) -> &'static str {
        "stop_task_orchestrator"
    }

    fn message_type(&self) -> MessageType {
        MessageType::StopRequest
    }

    async fn handle_message(&self, message: &InboundMessage) -> HandlerOutcome {
        match message.decode::<StopRequest>() {
            Ok(request) => self.handle(&request).await,
            Err(e) => HandlerOutcome::Rejected(e.to_string()),
        }
    }
}
