//! # Coordinator Bootstrap
//!
//! Builds the lock service, the three handlers and the handler registry from
//! a [`CoordinatorConfig`] and explicitly passed collaborators. Nothing is
//! looked up from a global container; every dependency arrives through
//! [`Collaborators`].

use std::sync::Arc;
use tracing::info;

use super::completion_notifier::CompletionNotifier;
use super::queue_drain::QueueDrainCoordinator;
use super::scope::ScopeResolver;
use super::stop_task::StopTaskOrchestrator;
use crate::config::CoordinatorConfig;
use crate::error::Result;
use crate::locking::{LockProvider, LockService};
use crate::messaging::{Consumer, ConsumerHandle, HandlerRegistry, MessageSource};
use crate::services::{
    Directory, MessageRepository, QueueDrainer, RealtimeChannel, SandboxExecutor, TaskStore, TopicRepository,
};

/// External services the handlers call
#[derive(Clone)]
pub struct Collaborators {
    pub tasks: Arc<dyn TaskStore>,
    pub topics: Arc<dyn TopicRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub sandbox: Arc<dyn SandboxExecutor>,
    pub drainer: Arc<dyn QueueDrainer>,
    pub directory: Arc<dyn Directory>,
    pub channel: Arc<dyn RealtimeChannel>,
}

/// Fully wired coordinator
pub struct CoordinatorSystem {
    config: CoordinatorConfig,
    lock_service: LockService,
    registry: Arc<HandlerRegistry>,
}

impl std::fmt::Debug for CoordinatorSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorSystem")
            .field("lock_provider", &self.lock_service.provider_name())
            .field("registry", &self.registry)
            .finish()
    }
}

impl CoordinatorSystem {
    /// Validate `config`, connect the configured lock backend and wire the handlers
    pub async fn bootstrap(config: &CoordinatorConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let provider = LockProvider::from_config(&config.lock).await?;
        Self::with_lock_provider(config, provider, collaborators)
    }

    /// Wire the handlers around an already constructed lock provider
    pub fn with_lock_provider(
        config: &CoordinatorConfig,
        provider: LockProvider,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let lock_service = LockService::new(provider, &config.lock);

        let queue_drain = QueueDrainCoordinator::new(
            lock_service.clone(),
            collaborators.drainer,
            config.queue_drain.clone(),
        );
        let stop_task = StopTaskOrchestrator::new(
            lock_service.clone(),
            ScopeResolver::new(collaborators.tasks, Arc::clone(&collaborators.topics)),
            collaborators.sandbox,
            config.stop_task.clone(),
        );
        let notifier = CompletionNotifier::new(
            collaborators.topics,
            collaborators.messages,
            collaborators.directory,
            collaborators.channel,
            config.notifier.clone(),
        );

        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(queue_drain))?;
        registry.register(Arc::new(stop_task))?;
        registry.register(Arc::new(notifier))?;

        info!(
            lock_provider = lock_service.provider_name(),
            handlers = registry.len(),
            "✅ BOOTSTRAP: Coordinator system ready"
        );

        Ok(Self {
            config: config.clone(),
            lock_service,
            registry: Arc::new(registry),
        })
    }

    pub fn registry(&self) -> Arc<HandlerRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn lock_service(&self) -> &LockService {
        &self.lock_service
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Start the consumer worker pool on `source`
    pub fn start_consumer(&self, source: Arc<dyn MessageSource>) -> ConsumerHandle {
        Consumer::new(self.registry(), source, self.config.consumer.clone()).start()
    }
}
