//! # Collaborator Contracts
//!
//! Narrow interfaces to the external services the coordinator reads from and
//! issues commands to. Handlers receive these as `Arc<dyn _>` at construction,
//! so production adapters and in-memory fakes are interchangeable.

pub mod directory;
pub mod drainer;
pub mod errors;
pub mod realtime;
pub mod sandbox;
pub mod stores;

pub use directory::Directory;
pub use drainer::QueueDrainer;
pub use errors::{CollaboratorError, CollaboratorResult};
pub use realtime::RealtimeChannel;
pub use sandbox::SandboxExecutor;
pub use stores::{MessageRepository, TaskStore, TopicRepository};
