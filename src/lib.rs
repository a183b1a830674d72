#![allow(clippy::doc_markdown)] // Allow technical terms like Redis, DashMap in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Topic Coordinator
//!
//! Event-driven coordination of per-topic agent work: draining a topic's
//! pending message queue, stopping running tasks across a workspace, project
//! or topic, and notifying users when summary tasks finish.
//!
//! ## Overview
//!
//! Inbound messages arrive at-least-once and in no particular order. Each is
//! dispatched through an explicit registry to one of three handlers, which
//! serialize their work per topic with short-lived, owner-checked distributed
//! locks and always return a classified outcome. Nothing re-raises past the
//! handler, so a single bad message can never stall the broker or kill a
//! worker.
//!
//! ## Module Organization
//!
//! - [`locking`] - Lock stores (in-memory, Redis) and the spin/mutex lock service
//! - [`orchestration`] - Queue drain, stop-task and completion-notification handlers
//! - [`messaging`] - Message envelope, handler registry, in-process broker, consumer pool
//! - [`services`] - Contracts for the external stores and services the handlers call
//! - [`models`] - Tasks, topics, messages and the inbound request shapes
//! - [`config`] - Layered configuration loading
//! - [`logging`] - Structured logging setup
//! - [`error`] - Crate-wide error type
//! - [`test_helpers`] - In-memory fakes of every collaborator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use topic_coordinator::config::CoordinatorConfig;
//! use topic_coordinator::messaging::{InMemoryBroker, InboundMessage};
//! use topic_coordinator::models::QueueDrainTrigger;
//! use topic_coordinator::orchestration::CoordinatorSystem;
//! use topic_coordinator::test_helpers::FakeCollaborators;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoordinatorConfig::default();
//! let system = CoordinatorSystem::bootstrap(&config, FakeCollaborators::new().collaborators()).await?;
//!
//! let broker = InMemoryBroker::new(config.consumer.channel_capacity);
//! let consumer = system.start_consumer(broker.clone());
//!
//! broker
//!     .publish(InboundMessage::queue_drain_trigger(&QueueDrainTrigger::new(5, 9))?)
//!     .await?;
//!
//! broker.close();
//! let stats = consumer.join().await;
//! println!("acked {} messages", stats.acked);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod locking;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod orchestration;
pub mod services;
pub mod test_helpers;

pub use config::{ConfigManager, CoordinatorConfig};
pub use error::{CoordinatorError, Result};
pub use locking::{LockMode, LockService};
pub use messaging::{HandlerRegistry, InMemoryBroker, InboundMessage, MessageType};
pub use orchestration::{Collaborators, CoordinatorSystem, HandlerOutcome};
