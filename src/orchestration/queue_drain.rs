//! # Queue Drain Coordinator
//!
//! Reacts to "task finished" cues by draining the topic's pending message
//! queue, with at most one drain per topic in flight across all instances.
//!
//! ```text
//! Received ──► LockAttempt ──┬──► LockedDraining ──► Released
//!                            └──► Skipped
//! ```
//!
//! The lock is taken in spin mode on `drain:<topic_id>`. When it cannot be
//! taken the trigger is acknowledged and dropped: the current holder picks up
//! anything queued after it started, or a later trigger retries. A trigger
//! redelivered after a drain has finished runs a second drain, which finds an
//! empty queue and reports zero processed messages.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::outcome::{HandlerOutcome, OutcomeDetail, SkipReason};
use crate::config::QueueDrainConfig;
use crate::constants::topic_lock_key;
use crate::locking::{Exclusive, LockMode, LockService};
use crate::messaging::{InboundMessage, MessageHandler, MessageType};
use crate::models::QueueDrainTrigger;
use crate::services::QueueDrainer;

pub struct QueueDrainCoordinator {
    lock_service: LockService,
    drainer: Arc<dyn QueueDrainer>,
    config: QueueDrainConfig,
}

impl QueueDrainCoordinator {
    pub fn new(lock_service: LockService, drainer: Arc<dyn QueueDrainer>, config: QueueDrainConfig) -> Self {
        Self {
            lock_service,
            drainer,
            config,
        }
    }

    pub fn lock_key(&self, topic_id: i64) -> String {
        topic_lock_key(&self.config.lock_key_prefix, topic_id)
    }

    #[instrument(skip(self), fields(topic_id = trigger.topic_id, task_id = trigger.task_id))]
    pub async fn handle(&self, trigger: &QueueDrainTrigger) -> HandlerOutcome {
        if let Err(reason) = trigger.validate() {
            return HandlerOutcome::Rejected(reason);
        }

        let topic_id = trigger.topic_id;
        let key = self.lock_key(topic_id);
        let drain = self.drainer.drain_pending(topic_id);

        match self
            .lock_service
            .run_exclusive(&key, self.config.lock_ttl(), LockMode::Spin, drain)
            .await
        {
            Exclusive::Ran(Ok(processed)) => {
                info!(processed = processed, "Drained pending topic messages");
                HandlerOutcome::Completed(OutcomeDetail::Drained { topic_id, processed })
            }
            Exclusive::Ran(Err(e)) => {
                warn!(error = %e, "Queue drain failed");
                HandlerOutcome::Fatal(format!("drain of topic {topic_id} failed: {e}"))
            }
            Exclusive::Panicked(message) => {
                HandlerOutcome::Fatal(format!("drain of topic {topic_id} panicked: {message}"))
            }
            Exclusive::Contended => {
                info!(lock_key = %key, "Drain already in progress, skipping trigger");
                HandlerOutcome::Skipped(SkipReason::LockContended { key })
            }
        }
    }
}

#[async_trait]
impl MessageHandler for QueueDrainCoordinator {
    fn handler_name(&self) -> &'static str {
        "queue_drain_coordinator"
    }

    fn message_type(&self) -> MessageType {
        MessageType::QueueDrainTrigger
    }

    async fn handle_message(&self, message: &InboundMessage) -> HandlerOutcome {
        match message.decode::<QueueDrainTrigger>() {
            Ok(trigger) => self.handle(&trigger).await,
            Err(e) => HandlerOutcome::Rejected(e.to_string()),
        }
    }
}
