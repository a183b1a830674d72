//! # Test Helpers
//!
//! In-memory implementations of every collaborator contract, plus builders
//! for the records they hold. Used by unit tests, the `tests/` suites, and
//! local wiring where no real services are available.
//!
//! The fakes record what was asked of them and can be told to fail, panic,
//! slow down, or block at a [`Gate`] so tests can hold a handler inside its
//! locked section.

pub mod fixtures;
pub mod notify;
pub mod sandbox;
pub mod stores;
pub mod sync;

use std::sync::Arc;

use crate::orchestration::Collaborators;

pub use fixtures::{agent_message, running_task, summary_topic, topic, user_message};
pub use notify::{FakeDirectory, PushedNotification, RecordingChannel};
pub use sandbox::{FakeQueueDrainer, InterruptCall, RecordingSandbox};
pub use stores::{InMemoryMessageRepository, InMemoryTaskStore, InMemoryTopicRepository};
pub use sync::{Gate, OccupancyTracker};

/// One fake per collaborator, kept concrete so tests can seed and inspect them
#[derive(Debug, Clone, Default)]
pub struct FakeCollaborators {
    pub tasks: Arc<InMemoryTaskStore>,
    pub topics: Arc<InMemoryTopicRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub sandbox: Arc<RecordingSandbox>,
    pub drainer: Arc<FakeQueueDrainer>,
    pub directory: Arc<FakeDirectory>,
    pub channel: Arc<RecordingChannel>,
}

impl FakeCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            tasks: self.tasks.clone(),
            topics: self.topics.clone(),
            messages: self.messages.clone(),
            sandbox: self.sandbox.clone(),
            drainer: self.drainer.clone(),
            directory: self.directory.clone(),
            channel: self.channel.clone(),
        }
    }
}
