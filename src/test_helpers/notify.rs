//! Directory and realtime channel fakes used by the completion notifier

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::services::{CollaboratorError, CollaboratorResult, Directory, RealtimeChannel};

/// Resolves `user -> route-<user>`, `project <id> -> "Project <id>"`,
/// `workspace <id> -> "Workspace <id>"` unless told otherwise
#[derive(Debug, Default)]
pub struct FakeDirectory {
    project_names: Mutex<HashMap<i64, String>>,
    workspace_names: Mutex<HashMap<i64, String>>,
    routing_failure: Mutex<Option<CollaboratorError>>,
    name_failure: Mutex<Option<CollaboratorError>>,
    panic_on_names: AtomicBool,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_project_name(&self, project_id: i64, name: impl Into<String>) {
        self.project_names.lock().insert(project_id, name.into());
    }

    pub fn set_workspace_name(&self, workspace_id: i64, name: impl Into<String>) {
        self.workspace_names.lock().insert(workspace_id, name.into());
    }

    pub fn fail_routing(&self, error: CollaboratorError) {
        *self.routing_failure.lock() = Some(error);
    }

    /// Project and workspace lookups fail with `error`
    pub fn fail_names(&self, error: CollaboratorError) {
        *self.name_failure.lock() = Some(error);
    }

    /// Project and workspace lookups panic
    pub fn panic_on_names(&self) {
        self.panic_on_names.store(true, Ordering::SeqCst);
    }

    fn name_lookup(&self, names: &Mutex<HashMap<i64, String>>, kind: &str, id: i64) -> CollaboratorResult<String> {
        if self.panic_on_names.load(Ordering::SeqCst) {
            panic!("{kind} lookup crashed for {id}");
        }
        if let Some(error) = self.name_failure.lock().clone() {
            return Err(error);
        }
        Ok(names
            .lock()
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("{kind} {id}")))
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn resolve_routing_id(&self, user_id: &str, _organization_code: &str) -> CollaboratorResult<String> {
        if let Some(error) = self.routing_failure.lock().clone() {
            return Err(error);
        }
        Ok(format!("route-{user_id}"))
    }

    async fn project_name(&self, project_id: i64) -> CollaboratorResult<String> {
        self.name_lookup(&self.project_names, "Project", project_id)
    }

    async fn workspace_name(&self, workspace_id: i64) -> CollaboratorResult<String> {
        self.name_lookup(&self.workspace_names, "Workspace", workspace_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushedNotification {
    pub routing_id: String,
    pub event: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Default)]
pub struct RecordingChannel {
    pushes: Mutex<Vec<PushedNotification>>,
    failing: AtomicBool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn pushes(&self) -> Vec<PushedNotification> {
        self.pushes.lock().clone()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.lock().len()
    }
}

#[async_trait]
impl RealtimeChannel for RecordingChannel {
    async fn push(&self, routing_id: &str, event: &str, payload: serde_json::Value) -> CollaboratorResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CollaboratorError::unavailable("realtime_channel", "socket closed"));
        }
        self.pushes.lock().push(PushedNotification {
            routing_id: routing_id.to_string(),
            event: event.to_string(),
            payload,
        });
        Ok(())
    }
}
