//! # Messaging Module
//!
//! Inbound side of the coordinator: the message envelope, the explicit
//! handler registry, the message source abstraction with an in-process
//! broker, and the consumer worker pool that ties them together.
//!
//! ```text
//! MessageSource ──► Consumer workers ──► HandlerRegistry::dispatch ──► MessageHandler
//!       ▲                  │                                                │
//!       └──── ack ◄────────┴──────────────── HandlerOutcome ◄───────────────┘
//! ```

pub mod consumer;
pub mod errors;
pub mod in_memory;
pub mod message;
pub mod registry;
pub mod source;

pub use consumer::{Consumer, ConsumerHandle, ConsumerStats, ConsumerStatsSnapshot};
pub use errors::{MessagingError, MessagingResult};
pub use in_memory::InMemoryBroker;
pub use message::{InboundMessage, MessageType};
pub use registry::{HandlerRegistry, MessageHandler};
pub use source::{Delivery, MessageSource};
