//! # Orchestration
//!
//! The three topic-scoped handlers and the wiring that builds them.
//!
//! | handler | input | lock | mode |
//! |---|---|---|---|
//! | [`QueueDrainCoordinator`] | `QueueDrainTrigger` | `drain:<topic_id>` | spin |
//! | [`StopTaskOrchestrator`] | `StopRequest` | `stop:<topic_id>` per group | mutex |
//! | [`CompletionNotifier`] | `TaskCallback` | none | |
//!
//! Every handler returns a [`HandlerOutcome`]; none of them returns an error
//! to the ingress.

pub mod bootstrap;
pub mod completion_notifier;
pub mod outcome;
pub mod queue_drain;
pub mod scope;
pub mod stop_task;

pub use bootstrap::{Collaborators, CoordinatorSystem};
pub use completion_notifier::CompletionNotifier;
pub use outcome::{HandlerOutcome, InterruptFailure, OutcomeDetail, SkipReason, StopSummary, TopicStopResult};
pub use queue_drain::QueueDrainCoordinator;
pub use scope::{group_by_topic, ScopeResolver};
pub use stop_task::StopTaskOrchestrator;
