//! Message source abstraction consumed by the worker pool.

use async_trait::async_trait;

use super::errors::MessagingResult;
use super::message::InboundMessage;

/// One received message plus the token needed to acknowledge it
#[derive(Debug, Clone)]
pub struct Delivery {
    pub delivery_tag: u64,
    pub message: InboundMessage,
}

/// At-least-once source of inbound messages
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Wait for the next delivery. `Ok(None)` means the source is closed
    /// and no more deliveries will arrive.
    async fn receive(&self) -> MessagingResult<Option<Delivery>>;

    /// Acknowledge a delivery so it is not redelivered
    async fn ack(&self, delivery_tag: u64) -> MessagingResult<()>;

    fn source_name(&self) -> &'static str;
}
