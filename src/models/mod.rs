//! # Domain Models
//!
//! Records read from the external task, topic and message stores, the three
//! inbound message shapes, and the outbound notification payload. None of
//! these are persisted by the coordinator itself.

pub mod message;
pub mod notification;
pub mod requests;
pub mod task;
pub mod topic;

pub use message::{SenderType, TopicMessage};
pub use notification::NotificationPayload;
pub use requests::{QueueDrainTrigger, ScopeType, StopRequest, StopScope, TaskCallback};
pub use task::{Task, TaskStatus};
pub use topic::{Topic, TopicFilter, TopicMode};
