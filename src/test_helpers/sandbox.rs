//! Recording sandbox executor and queue drainer

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::sync::{Gate, OccupancyTracker};
use crate::services::{CollaboratorError, CollaboratorResult, QueueDrainer, SandboxExecutor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptCall {
    pub sandbox_id: String,
    pub task_id: i64,
    pub reason: String,
}

/// Records every interrupt; selected tasks fail or panic
#[derive(Debug, Default)]
pub struct RecordingSandbox {
    calls: Mutex<Vec<InterruptCall>>,
    failing: Mutex<HashSet<i64>>,
    panicking: Mutex<HashSet<i64>>,
    gate: Mutex<Option<Gate>>,
    delay: Mutex<Option<Duration>>,
    occupancy: OccupancyTracker,
}

impl RecordingSandbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interrupting `task_id` returns a sandbox error
    pub fn fail_on(&self, task_id: i64) {
        self.failing.lock().insert(task_id);
    }

    /// Interrupting `task_id` panics
    pub fn panic_on(&self, task_id: i64) {
        self.panicking.lock().insert(task_id);
    }

    /// Hold every interrupt at `gate` until it opens
    pub fn block_on(&self, gate: Gate) {
        *self.gate.lock() = Some(gate);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> Vec<InterruptCall> {
        self.calls.lock().clone()
    }

    pub fn interrupted_task_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.calls.lock().iter().map(|c| c.task_id).collect();
        ids.sort_unstable();
        ids
    }

    /// Peak number of interrupts in flight at once
    pub fn max_concurrent_interrupts(&self) -> usize {
        self.occupancy.max()
    }
}

#[async_trait]
impl SandboxExecutor for RecordingSandbox {
    async fn send_interrupt(&self, sandbox_id: &str, task_id: i64, reason: &str) -> CollaboratorResult<()> {
        let _inside = self.occupancy.enter();
        self.calls.lock().push(InterruptCall {
            sandbox_id: sandbox_id.to_string(),
            task_id,
            reason: reason.to_string(),
        });

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.panicking.lock().contains(&task_id) {
            panic!("sandbox client crashed interrupting task {task_id}");
        }
        if self.failing.lock().contains(&task_id) {
            return Err(CollaboratorError::sandbox(sandbox_id, "sandbox refused interrupt"));
        }
        Ok(())
    }
}

/// Drainer returning configured pending counts, with per-topic occupancy
#[derive(Debug, Default)]
pub struct FakeQueueDrainer {
    pending: DashMap<i64, u64>,
    drain_calls: AtomicUsize,
    occupancy: DashMap<i64, Arc<OccupancyTracker>>,
    overall: OccupancyTracker,
    gate: Mutex<Option<Gate>>,
    delay: Mutex<Option<Duration>>,
    failure: Mutex<Option<CollaboratorError>>,
}

impl FakeQueueDrainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pending(&self, topic_id: i64, count: u64) {
        self.pending.insert(topic_id, count);
    }

    pub fn pending(&self, topic_id: i64) -> u64 {
        self.pending.get(&topic_id).map(|c| *c).unwrap_or(0)
    }

    pub fn block_on(&self, gate: Gate) {
        *self.gate.lock() = Some(gate);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Every drain fails with `error` from now on
    pub fn fail_with(&self, error: CollaboratorError) {
        *self.failure.lock() = Some(error);
    }

    pub fn drain_calls(&self) -> usize {
        self.drain_calls.load(Ordering::SeqCst)
    }

    /// Peak number of drains in flight at once for `topic_id`
    pub fn max_concurrent_drains(&self, topic_id: i64) -> usize {
        self.occupancy.get(&topic_id).map(|t| t.max()).unwrap_or(0)
    }

    /// Peak number of drains in flight at once across all topics
    pub fn max_concurrent_drains_overall(&self) -> usize {
        self.overall.max()
    }

    fn tracker(&self, topic_id: i64) -> Arc<OccupancyTracker> {
        Arc::clone(self.occupancy.entry(topic_id).or_default().value())
    }
}

#[async_trait]
impl QueueDrainer for FakeQueueDrainer {
    async fn drain_pending(&self, topic_id: i64) -> CollaboratorResult<u64> {
        self.drain_calls.fetch_add(1, Ordering::SeqCst);
        let tracker = self.tracker(topic_id);
        let _inside = tracker.enter();
        let _overall = self.overall.enter();

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failure.lock().clone();
        if let Some(error) = failure {
            return Err(error);
        }

        Ok(self
            .pending
            .insert(topic_id, 0)
            .unwrap_or(0))
    }
}
