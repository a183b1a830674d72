//! # Consumer Worker Pool
//!
//! `worker_count` tokio tasks pull deliveries from a shared [`MessageSource`],
//! dispatch them through the [`HandlerRegistry`] and acknowledge every one of
//! them, whatever the outcome. Each worker handles one delivery at a time;
//! parallelism across topics comes from running several workers.
//!
//! Shutdown is signalled through a `tokio::sync::watch` channel. A worker
//! finishes the delivery it is processing before it exits.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::registry::HandlerRegistry;
use super::source::MessageSource;
use crate::config::ConsumerConfig;
use crate::orchestration::outcome::HandlerOutcome;

const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Counters shared by all workers of one consumer
#[derive(Debug, Default)]
pub struct ConsumerStats {
    received: AtomicU64,
    acked: AtomicU64,
    ack_failures: AtomicU64,
    receive_errors: AtomicU64,
    completed: AtomicU64,
    skipped: AtomicU64,
    partial_failures: AtomicU64,
    rejected: AtomicU64,
    fatal: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsumerStatsSnapshot {
    pub received: u64,
    pub acked: u64,
    pub ack_failures: u64,
    pub receive_errors: u64,
    pub completed: u64,
    pub skipped: u64,
    pub partial_failures: u64,
    pub rejected: u64,
    pub fatal: u64,
}

impl ConsumerStats {
    fn record_outcome(&self, outcome: &HandlerOutcome) {
        let counter = match outcome {
            HandlerOutcome::Completed(_) => &self.completed,
            HandlerOutcome::Skipped(_) => &self.skipped,
            HandlerOutcome::PartialFailure(_) => &self.partial_failures,
            HandlerOutcome::Rejected(_) => &self.rejected,
            HandlerOutcome::Fatal(_) => &self.fatal,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ConsumerStatsSnapshot {
        ConsumerStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            acked: self.acked.load(Ordering::Relaxed),
            ack_failures: self.ack_failures.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            partial_failures: self.partial_failures.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            fatal: self.fatal.load(Ordering::Relaxed),
        }
    }
}

pub struct Consumer {
    registry: Arc<HandlerRegistry>,
    source: Arc<dyn MessageSource>,
    config: ConsumerConfig,
}

impl Consumer {
    pub fn new(registry: Arc<HandlerRegistry>, source: Arc<dyn MessageSource>, config: ConsumerConfig) -> Self {
        Self {
            registry,
            source,
            config,
        }
    }

    /// Spawn the workers and return a handle controlling them
    pub fn start(self) -> ConsumerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(ConsumerStats::default());
        let worker_count = self.config.worker_count.max(1);

        info!(
            workers = worker_count,
            source = self.source.source_name(),
            handlers = self.registry.len(),
            "🚀 CONSUMER: Starting worker pool"
        );

        let workers = (0..worker_count)
            .map(|worker_id| {
                let worker = Worker {
                    worker_id,
                    registry: Arc::clone(&self.registry),
                    source: Arc::clone(&self.source),
                    stats: Arc::clone(&stats),
                    shutdown: shutdown_rx.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        ConsumerHandle {
            shutdown_tx,
            workers,
            stats,
        }
    }
}

pub struct ConsumerHandle {
    shutdown_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
    stats: Arc<ConsumerStats>,
}

impl ConsumerHandle {
    pub fn stats(&self) -> ConsumerStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Signal every worker to stop and wait until they have
    pub async fn shutdown(self) -> ConsumerStatsSnapshot {
        info!("🛑 CONSUMER: Shutdown requested");
        // Receivers live as long as the workers; a send error means they already exited
        let _ = self.shutdown_tx.send(true);
        self.join().await
    }

    /// Wait for the workers to exit on their own (the source closed)
    pub async fn join(self) -> ConsumerStatsSnapshot {
        for handle in self.workers {
            if let Err(e) = handle.await {
                error!(error = %e, "Consumer worker terminated abnormally");
            }
        }
        let snapshot = self.stats.snapshot();
        info!(stats = ?snapshot, "🛑 CONSUMER: All workers stopped");
        snapshot
    }
}

struct Worker {
    worker_id: usize,
    registry: Arc<HandlerRegistry>,
    source: Arc<dyn MessageSource>,
    stats: Arc<ConsumerStats>,
    shutdown: watch::Receiver<bool>,
}

impl Worker {
    async fn run(mut self) {
        debug!(worker_id = self.worker_id, "Consumer worker started");

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let received = tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                received = self.source.receive() => received,
            };

            let delivery = match received {
                Ok(Some(delivery)) => delivery,
                Ok(None) => {
                    debug!(worker_id = self.worker_id, "Message source closed");
                    break;
                }
                Err(e) => {
                    self.stats.receive_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(worker_id = self.worker_id, error = %e, "Failed to receive message");
                    tokio::select! {
                        _ = tokio::time::sleep(RECEIVE_ERROR_BACKOFF) => {},
                        _ = self.shutdown.changed() => break,
                    }
                    continue;
                }
            };

            self.stats.received.fetch_add(1, Ordering::Relaxed);
            let outcome = self.registry.dispatch(&delivery.message).await;
            self.stats.record_outcome(&outcome);

            match self.source.ack(delivery.delivery_tag).await {
                Ok(()) => {
                    self.stats.acked.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    self.stats.ack_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        worker_id = self.worker_id,
                        delivery_tag = delivery.delivery_tag,
                        error = %e,
                        "Failed to acknowledge delivery"
                    );
                }
            }
        }

        debug!(worker_id = self.worker_id, "Consumer worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{InMemoryBroker, InboundMessage, MessageHandler, MessageType};
    use crate::orchestration::outcome::SkipReason;
    use async_trait::async_trait;
    use serde_json::json;

    struct SkippingHandler;

    #[async_trait]
    impl MessageHandler for SkippingHandler {
        fn handler_name(&self) -> &'static str {
            "skipping"
        }

        fn message_type(&self) -> MessageType {
            MessageType::StopRequest
        }

        async fn handle_message(&self, _message: &InboundMessage) -> HandlerOutcome {
            HandlerOutcome::Skipped(SkipReason::NoRunningTasks)
        }
    }

    fn registry() -> Arc<HandlerRegistry> {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(SkippingHandler)).unwrap();
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_every_delivery_is_acked_including_unroutable() {
        let broker = InMemoryBroker::new(16);
        for _ in 0..3 {
            broker
                .publish(InboundMessage::new(MessageType::StopRequest, json!({})))
                .await
                .unwrap();
        }
        broker
            .publish(InboundMessage::new(MessageType::TaskCallback, json!({})))
            .await
            .unwrap();
        broker.close();

        let handle = Consumer::new(
            registry(),
            broker.clone(),
            ConsumerConfig {
                worker_count: 2,
                ..ConsumerConfig::default()
            },
        )
        .start();
        assert_eq!(handle.worker_count(), 2);

        let stats = handle.join().await;
        assert_eq!(stats.received, 4);
        assert_eq!(stats.acked, 4);
        assert_eq!(stats.skipped, 3);
        assert_eq!(stats.rejected, 1);
        assert_eq!(broker.acked_count(), 4);
        assert_eq!(broker.unacked_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_idle_workers() {
        let broker = InMemoryBroker::new(4);
        let handle = Consumer::new(registry(), broker.clone(), ConsumerConfig::default()).start();

        let stats = tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .expect("workers should stop promptly");
        assert_eq!(stats.received, 0);
    }
}
