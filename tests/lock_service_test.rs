//! Lock service behavior shared by several coordinator instances on one store.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::test_config;
use tokio_test::{assert_err, assert_ok};
use topic_coordinator::locking::{Exclusive, InMemoryLockStore, LockMode, LockProvider, LockService, LockStore};
use topic_coordinator::test_helpers::OccupancyTracker;

fn instance(store: &InMemoryLockStore, instance_id: &str) -> LockService {
    let mut config = test_config().lock;
    config.instance_id = instance_id.to_string();
    LockService::new(LockProvider::memory(store.clone()), &config)
}

#[tokio::test(start_paused = true)]
async fn test_release_after_expiry_and_reacquire_keeps_new_owner() {
    let store = InMemoryLockStore::new();
    let a = instance(&store, "a");
    let b = instance(&store, "b");
    let owner_a = a.new_owner_token();
    let owner_b = b.new_owner_token();

    assert!(a.acquire("drain:1", &owner_a, Duration::from_secs(5), LockMode::Mutex).await);
    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(b.acquire("drain:1", &owner_b, Duration::from_secs(60), LockMode::Mutex).await);

    assert!(!a.release("drain:1", &owner_a).await);
    assert!(!a.extend("drain:1", &owner_a, Duration::from_secs(60)).await);
    assert_eq!(b.current_owner("drain:1").await, Some(owner_b.clone()));

    assert!(b.release("drain:1", &owner_b).await);
    assert_eq!(store.live_lock_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_extend_keeps_lock_alive_past_original_ttl() {
    let store = InMemoryLockStore::new();
    let a = instance(&store, "a");
    let b = instance(&store, "b");
    let owner = a.new_owner_token();

    assert!(a.acquire("stop:3", &owner, Duration::from_secs(5), LockMode::Mutex).await);
    tokio::time::advance(Duration::from_secs(4)).await;
    assert!(a.extend("stop:3", &owner, Duration::from_secs(5)).await);
    tokio::time::advance(Duration::from_secs(4)).await;

    assert!(!b.acquire("stop:3", "b-owner", Duration::from_secs(5), LockMode::Mutex).await);
    assert_eq!(a.current_owner("stop:3").await.as_deref(), Some(owner.as_str()));
}

#[tokio::test]
async fn test_run_exclusive_admits_one_holder_at_a_time() {
    let store = InMemoryLockStore::new();
    let tracker = Arc::new(OccupancyTracker::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = instance(&store, &format!("worker-{i}"));
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move {
                service
                    .run_exclusive("drain:42", Duration::from_secs(30), LockMode::Spin, async {
                        let _inside = tracker.enter();
                        tokio::time::sleep(Duration::from_millis(5)).await;
                    })
                    .await
            })
        })
        .collect();

    let mut ran = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Exclusive::Ran(()) => ran += 1,
            Exclusive::Contended => {}
            Exclusive::Panicked(message) => panic!("work panicked: {message}"),
        }
    }

    assert!(ran >= 1);
    assert_eq!(tracker.max(), 1);
    assert_eq!(store.live_lock_count(), 0);
}

#[tokio::test]
async fn test_store_outage_reports_no_exclusivity() {
    let store = InMemoryLockStore::new();
    let service = instance(&store, "a");
    store.set_unavailable(true);

    assert_err!(store.try_acquire("drain:1", "x", Duration::from_secs(1)).await);
    let outcome = service
        .run_exclusive("drain:1", Duration::from_secs(1), LockMode::Spin, async { 1 })
        .await;
    assert!(matches!(outcome, Exclusive::Contended));

    store.set_unavailable(false);
    assert_ok!(store.health_check().await);
    assert!(service.health_check().await);
}

#[test]
fn test_owner_tokens_carry_instance_id() {
    let store = InMemoryLockStore::new();
    let token = instance(&store, "pod-7").new_owner_token();
    assert!(token.starts_with("pod-7:"));
    assert_eq!(token.len(), "pod-7:".len() + 36);
}
