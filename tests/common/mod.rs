//! Shared setup for the integration suites: a coordinator wired to in-memory
//! fakes and an in-memory lock store, with a short spin window.

#![allow(dead_code)] // Not every suite uses every helper

use topic_coordinator::config::{CoordinatorConfig, LockConfig};
use topic_coordinator::locking::{InMemoryLockStore, LockProvider, LockService};
use topic_coordinator::models::{ScopeType, StopRequest, TaskCallback};
use topic_coordinator::orchestration::CoordinatorSystem;
use topic_coordinator::test_helpers::FakeCollaborators;

pub struct Harness {
    pub fakes: FakeCollaborators,
    pub locks: InMemoryLockStore,
    pub system: CoordinatorSystem,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: CoordinatorConfig) -> Self {
        let fakes = FakeCollaborators::new();
        let locks = InMemoryLockStore::new();
        let system = CoordinatorSystem::with_lock_provider(
            &config,
            LockProvider::memory(locks.clone()),
            fakes.collaborators(),
        )
        .expect("coordinator should wire with in-memory fakes");
        Self { fakes, locks, system }
    }

    /// A second lock client on the same store, as another instance would have
    pub fn other_instance_lock_service(&self) -> LockService {
        LockService::new(LockProvider::memory(self.locks.clone()), &self.system.config().lock)
    }
}

pub fn test_config() -> CoordinatorConfig {
    CoordinatorConfig {
        lock: LockConfig {
            spin_timeout_ms: 200,
            spin_interval_ms: 10,
            ..LockConfig::default()
        },
        ..CoordinatorConfig::default()
    }
}

pub fn stop_request(scope_type: ScopeType, scope_id: i64) -> StopRequest {
    StopRequest {
        event_id: format!("evt-{scope_type}-{scope_id}"),
        scope_type: Some(scope_type),
        scope_id,
        user_id: "user-1".to_string(),
        organization_code: "org-1".to_string(),
        reason: "operator requested stop".to_string(),
    }
}

pub fn task_callback(topic_id: i64, task_id: i64, status: &str) -> TaskCallback {
    TaskCallback {
        task_id,
        topic_id,
        user_id: "user-1".to_string(),
        organization_code: "org-1".to_string(),
        status: status.to_string(),
    }
}
