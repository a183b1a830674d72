//! # Completion Notifier
//!
//! Pushes a best-effort realtime notification when a summary task reaches a
//! terminal status.
//!
//! A callback only produces a push when all of these hold:
//!
//! - the status is terminal (`finished` or `error`)
//! - one of the user's messages for `(topic_id, task_id)` carries
//!   `summary_task: true` in its raw payload
//! - the topic exists and is in summary mode
//!
//! Display lookups (routing identity, project name, workspace name) degrade
//! individually: a failed name becomes an empty string and a failed routing
//! lookup falls back to the raw user id. None of them suppresses the push.

use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::outcome::{HandlerOutcome, OutcomeDetail, SkipReason};
use crate::config::NotifierConfig;
use crate::locking::service::panic_message;
use crate::messaging::{InboundMessage, MessageHandler, MessageType};
use crate::models::{NotificationPayload, TaskCallback, TaskStatus, TopicMode};
use crate::services::{
    CollaboratorError, CollaboratorResult, Directory, MessageRepository, RealtimeChannel, TopicRepository,
};

pub struct CompletionNotifier {
    topics: Arc<dyn TopicRepository>,
    messages: Arc<dyn MessageRepository>,
    directory: Arc<dyn Directory>,
    channel: Arc<dyn RealtimeChannel>,
    config: NotifierConfig,
}

impl CompletionNotifier {
    pub fn new(
        topics: Arc<dyn TopicRepository>,
        messages: Arc<dyn MessageRepository>,
        directory: Arc<dyn Directory>,
        channel: Arc<dyn RealtimeChannel>,
        config: NotifierConfig,
    ) -> Self {
        Self {
            topics,
            messages,
            directory,
            channel,
            config,
        }
    }

    #[instrument(
        skip(self, callback),
        fields(task_id = callback.task_id, topic_id = callback.topic_id, status = %callback.status)
    )]
    pub async fn handle(&self, callback: &TaskCallback) -> HandlerOutcome {
        let Some(status) = callback.terminal_status() else {
            return HandlerOutcome::Skipped(SkipReason::NonTerminalStatus {
                status: callback.status.clone(),
            });
        };

        if let Err(reason) = callback.validate() {
            return HandlerOutcome::Rejected(reason);
        }

        match self.notify(callback, status).await {
            Ok(outcome) => outcome,
            Err(e) => HandlerOutcome::Fatal(format!(
                "completion notification for task {} failed: {e}",
                callback.task_id
            )),
        }
    }

    async fn notify(&self, callback: &TaskCallback, status: TaskStatus) -> CollaboratorResult<HandlerOutcome> {
        let messages = self
            .messages
            .list_user_messages(callback.topic_id, callback.task_id)
            .await?;
        let marked = messages
            .iter()
            .any(|m| m.is_from_user() && m.has_summary_marker());
        if !marked {
            debug!(messages = messages.len(), "No summary marker on user messages");
            return Ok(HandlerOutcome::Skipped(SkipReason::NoSummaryMarker));
        }

        let Some(topic) = self.topics.find_topic(callback.topic_id).await? else {
            return Ok(HandlerOutcome::Skipped(SkipReason::TopicNotFound {
                topic_id: callback.topic_id,
            }));
        };
        if topic.mode != TopicMode::Summary {
            return Ok(HandlerOutcome::Skipped(SkipReason::TopicModeMismatch { mode: topic.mode }));
        }

        let routing_id = resolve_or(
            "routing_id",
            self.directory
                .resolve_routing_id(&callback.user_id, &callback.organization_code),
            callback.user_id.clone(),
        )
        .await;
        let project_name = resolve_or(
            "project_name",
            self.directory.project_name(topic.project_id),
            String::new(),
        )
        .await;
        let workspace_name = resolve_or(
            "workspace_name",
            self.directory.workspace_name(topic.workspace_id),
            String::new(),
        )
        .await;

        let success = status == TaskStatus::Finished;
        let payload = NotificationPayload {
            workspace_id: topic.workspace_id,
            workspace_name,
            project_id: topic.project_id,
            project_name,
            topic_id: topic.id,
            organization_code: callback.organization_code.clone(),
            success,
            timestamp: Utc::now().timestamp(),
        };

        let body = serde_json::to_value(&payload)
            .map_err(|e| CollaboratorError::operation("serialize_notification", e.to_string()))?;
        self.channel.push(&routing_id, &self.config.event_name, body).await?;

        info!(routing_id = %routing_id, success = success, "Summary completion notification pushed");
        Ok(HandlerOutcome::Completed(OutcomeDetail::Notified { routing_id, success }))
    }
}

/// Await a display lookup, substituting `fallback` on error or panic
async fn resolve_or<F>(lookup: &str, resolve: F, fallback: String) -> String
where
    F: Future<Output = CollaboratorResult<String>>,
{
    match AssertUnwindSafe(resolve).catch_unwind().await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            warn!(lookup = lookup, error = %e, "Lookup failed, using fallback");
            fallback
        }
        Err(panic) => {
            warn!(
                lookup = lookup,
                panic = %panic_message(panic.as_ref()),
                "Lookup panicked, using fallback"
            );
            fallback
        }
    }
}

#[async_trait]
impl MessageHandler for CompletionNotifier {
    fn handler_name(&self) -> &'static str {
        "completion_notifier"
    }

    fn message_type(&self) -> MessageType {
        MessageType::TaskCallback
    }

    async fn handle_message(&self, message: &InboundMessage) -> HandlerOutcome {
        match message.decode::<TaskCallback>() {
            Ok(callback) => self.handle(&callback).await,
            Err(e) => HandlerOutcome::Rejected(e.to_string()),
        }
    }
}
