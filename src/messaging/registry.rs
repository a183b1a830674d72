//! # Handler Registry
//!
//! Explicit map from [`MessageType`] to the handler that processes it, wired
//! at startup in ordinary code. The registry is also the last line of
//! defense for the ingress contract: whatever a handler does, `dispatch`
//! returns a classified [`HandlerOutcome`] and never an error or a panic.

use async_trait::async_trait;
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, Instrument};

use super::errors::{MessagingError, MessagingResult};
use super::message::{InboundMessage, MessageType};
use crate::locking::service::panic_message;
use crate::logging::log_handler_outcome;
use crate::orchestration::outcome::HandlerOutcome;

/// One consumer of one inbound message shape
#[async_trait]
pub trait MessageHandler: Send + Sync {
    fn handler_name(&self) -> &'static str;

    fn message_type(&self) -> MessageType;

    /// Process one delivery. Every result, including malformed input, is
    /// expressed as an outcome; the delivery is acknowledged afterwards.
    async fn handle_message(&self, message: &InboundMessage) -> HandlerOutcome;
}

#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<MessageType, Arc<dyn MessageHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self
            .handlers
            .iter()
            .map(|(t, h)| format!("{t}={}", h.handler_name()))
            .collect();
        names.sort();
        f.debug_struct("HandlerRegistry").field("handlers", &names).finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to its message type. A type can only be bound once.
    pub fn register(&mut self, handler: Arc<dyn MessageHandler>) -> MessagingResult<()> {
        let message_type = handler.message_type();
        if let Some(existing) = self.handlers.get(&message_type) {
            return Err(MessagingError::DuplicateHandler {
                message_type,
                existing: existing.handler_name().to_string(),
            });
        }

        info!(
            message_type = %message_type,
            handler = handler.handler_name(),
            "📝 REGISTRY: Handler registered"
        );
        self.handlers.insert(message_type, handler);
        Ok(())
    }

    pub fn handler_for(&self, message_type: MessageType) -> Option<&Arc<dyn MessageHandler>> {
        self.handlers.get(&message_type)
    }

    pub fn registered_types(&self) -> Vec<MessageType> {
        let mut types: Vec<_> = self.handlers.keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route `message` to its handler and log the outcome
    pub async fn dispatch(&self, message: &InboundMessage) -> HandlerOutcome {
        let correlation_id = message.correlation_id.to_string();

        let Some(handler) = self.handlers.get(&message.message_type) else {
            let outcome = HandlerOutcome::Rejected(
                MessagingError::HandlerNotFound {
                    message_type: message.message_type,
                }
                .to_string(),
            );
            log_handler_outcome("registry", &correlation_id, &outcome);
            return outcome;
        };

        let span = tracing::info_span!(
            "dispatch",
            handler = handler.handler_name(),
            message_id = %message.message_id,
            correlation_id = %correlation_id,
        );

        let outcome = match AssertUnwindSafe(handler.handle_message(message))
            .catch_unwind()
            .instrument(span)
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => HandlerOutcome::Fatal(format!(
                "handler panicked: {}",
                panic_message(panic.as_ref())
            )),
        };

        log_handler_outcome(handler.handler_name(), &correlation_id, &outcome);
        outcome
    }
}
