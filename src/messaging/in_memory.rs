//! # In-Process Broker
//!
//! Bounded `tokio::sync::mpsc` channel implementing [`MessageSource`]. Used
//! for in-process domain events (a task finishing in the same process
//! publishes its drain trigger here) and as the broker in tests.
//!
//! Deliveries stay in an unacked set until acknowledged, so tests can assert
//! that every delivery was acked exactly once.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use super::errors::{MessagingError, MessagingResult};
use super::message::InboundMessage;
use super::source::{Delivery, MessageSource};

#[derive(Debug)]
pub struct InMemoryBroker {
    sender: Mutex<Option<mpsc::Sender<Delivery>>>,
    receiver: tokio::sync::Mutex<mpsc::Receiver<Delivery>>,
    next_tag: AtomicU64,
    unacked: DashMap<u64, InboundMessage>,
    acked: AtomicU64,
}

impl InMemoryBroker {
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Arc::new(Self {
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
            next_tag: AtomicU64::new(1),
            unacked: DashMap::new(),
            acked: AtomicU64::new(0),
        })
    }

    /// Enqueue a message, waiting for capacity if the channel is full
    pub async fn publish(&self, message: InboundMessage) -> MessagingResult<u64> {
        let sender = self.sender.lock().clone().ok_or(MessagingError::SourceClosed)?;
        let delivery_tag = self.next_tag.fetch_add(1, Ordering::SeqCst);

        debug!(
            delivery_tag = delivery_tag,
            message_type = %message.message_type,
            correlation_id = %message.correlation_id,
            "Publishing in-process message"
        );

        sender
            .send(Delivery {
                delivery_tag,
                message,
            })
            .await
            .map_err(|_| MessagingError::SourceClosed)?;
        Ok(delivery_tag)
    }

    /// Stop accepting publishes. Messages already queued are still delivered,
    /// after which `receive` returns `None`.
    pub fn close(&self) {
        self.sender.lock().take();
    }

    pub fn acked_count(&self) -> u64 {
        self.acked.load(Ordering::SeqCst)
    }

    pub fn unacked_count(&self) -> usize {
        self.unacked.len()
    }
}

#[async_trait]
impl MessageSource for InMemoryBroker {
    async fn receive(&self) -> MessagingResult<Option<Delivery>> {
        let delivery = self.receiver.lock().await.recv().await;
        if let Some(delivery) = &delivery {
            self.unacked
                .insert(delivery.delivery_tag, delivery.message.clone());
        }
        Ok(delivery)
    }

    async fn ack(&self, delivery_tag: u64) -> MessagingResult<()> {
        match self.unacked.remove(&delivery_tag) {
            Some(_) => {
                self.acked.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(MessagingError::source(
                "ack",
                format!("unknown or already acknowledged delivery tag {delivery_tag}"),
            )),
        }
    }

    fn source_name(&self) -> &'static str {
        "in_memory"
    }
}
