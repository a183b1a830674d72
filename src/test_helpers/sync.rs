//! Concurrency probes for fakes: an occupancy counter and a gate that holds
//! callers inside a collaborator call until the test opens it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};

/// Counts callers currently inside a section and remembers the peak
#[derive(Debug, Default)]
pub struct OccupancyTracker {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl OccupancyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> OccupancyGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
        OccupancyGuard { tracker: self }
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    pub fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

pub struct OccupancyGuard<'a> {
    tracker: &'a OccupancyTracker,
}

impl Drop for OccupancyGuard<'_> {
    fn drop(&mut self) {
        self.tracker.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Closed until [`Gate::open`]; callers of [`Gate::pass`] wait for it
#[derive(Debug, Clone)]
pub struct Gate {
    state: Arc<GateState>,
}

#[derive(Debug)]
struct GateState {
    open: watch::Sender<bool>,
    entered: AtomicUsize,
    entered_notify: Notify,
}

impl Gate {
    pub fn closed() -> Self {
        let (open, _) = watch::channel(false);
        Self {
            state: Arc::new(GateState {
                open,
                entered: AtomicUsize::new(0),
                entered_notify: Notify::new(),
            }),
        }
    }

    pub async fn pass(&self) {
        let mut open = self.state.open.subscribe();
        self.state.entered.fetch_add(1, Ordering::SeqCst);
        self.state.entered_notify.notify_waiters();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = open.wait_for(|open| *open).await;
    }

    pub fn open(&self) {
        self.state.open.send_replace(true);
    }

    /// Number of callers that have reached the gate
    pub fn entered(&self) -> usize {
        self.state.entered.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` callers have reached the gate
    pub async fn wait_for_entered(&self, count: usize) {
        loop {
            let notified = self.state.entered_notify.notified();
            if self.entered() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tracker_records_peak() {
        let tracker = OccupancyTracker::new();
        {
            let _a = tracker.enter();
            let _b = tracker.enter();
            assert_eq!(tracker.current(), 2);
        }
        let _c = tracker.enter();
        assert_eq!(tracker.current(), 1);
        assert_eq!(tracker.max(), 2);
    }

    #[tokio::test]
    async fn test_gate_holds_until_opened() {
        let gate = Gate::closed();
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.pass().await })
        };

        gate.wait_for_entered(1).await;
        assert!(!waiter.is_finished());

        gate.open();
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
