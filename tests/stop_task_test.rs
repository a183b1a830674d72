//! Stop orchestration: scope resolution, per-task isolation and per-topic
//! exclusion.

mod common;

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use common::{stop_request, test_config, Harness};
use topic_coordinator::locking::LockMode;
use topic_coordinator::messaging::{InboundMessage, MessageType};
use topic_coordinator::models::ScopeType;
use topic_coordinator::orchestration::{HandlerOutcome, OutcomeDetail, SkipReason};
use topic_coordinator::test_helpers::{running_task, topic, Gate};

fn stop(scope_type: ScopeType, scope_id: i64) -> InboundMessage {
    InboundMessage::stop_request(&stop_request(scope_type, scope_id)).unwrap()
}

#[tokio::test]
async fn test_project_scope_stops_tasks_under_soft_deleted_topics() {
    let harness = Harness::new();
    harness.fakes.topics.insert(topic(1, 10, 100));
    let mut deleted = topic(2, 10, 100);
    deleted.deleted_at = Some(Utc::now());
    harness.fakes.topics.insert(deleted);
    harness.fakes.tasks.insert(running_task(101, 1));
    harness.fakes.tasks.insert(running_task(102, 2));

    let outcome = harness
        .system
        .registry()
        .dispatch(&stop(ScopeType::Project, 10))
        .await;

    match outcome {
        HandlerOutcome::Completed(OutcomeDetail::Stopped(summary)) => {
            assert_eq!(summary.total_tasks, 2);
            assert_eq!(summary.succeeded, 2);
            assert_eq!(summary.processed_topics, 2);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(harness.fakes.sandbox.interrupted_task_ids(), vec![101, 102]);
    assert_eq!(harness.fakes.tasks.batch_lookups(), 1);
    assert_eq!(harness.locks.live_lock_count(), 0);
}

#[tokio::test]
async fn test_one_failing_interrupt_does_not_abort_siblings() {
    let harness = Harness::new();
    for id in [1, 2, 3] {
        harness.fakes.tasks.insert(running_task(id, 7));
    }
    harness.fakes.sandbox.fail_on(2);

    let outcome = harness
        .system
        .registry()
        .dispatch(&stop(ScopeType::Topic, 7))
        .await;

    match outcome {
        HandlerOutcome::PartialFailure(summary) => {
            assert_eq!(summary.succeeded, 2);
            assert_eq!(summary.failed, 1);
            assert_eq!(summary.failures.len(), 1);
            assert_eq!(summary.failures[0].task_id, 2);
            assert_eq!(summary.failures[0].topic_id, 7);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    let called: Vec<i64> = harness.fakes.sandbox.calls().iter().map(|c| c.task_id).collect();
    assert_eq!(called, vec![1, 2, 3]);
    assert_eq!(harness.locks.live_lock_count(), 0);
}

#[tokio::test]
async fn test_topic_already_being_stopped_is_skipped() {
    let harness = Harness::new();
    harness.fakes.topics.insert(topic(7, 10, 100));
    harness.fakes.topics.insert(topic(8, 10, 100));
    harness.fakes.tasks.insert(running_task(71, 7));
    harness.fakes.tasks.insert(running_task(72, 7));
    harness.fakes.tasks.insert(running_task(81, 8));

    let other = harness.other_instance_lock_service();
    assert!(
        other
            .acquire("stop:7", "other-instance", Duration::from_secs(60), LockMode::Mutex)
            .await
    );

    let outcome = harness
        .system
        .registry()
        .dispatch(&stop(ScopeType::Project, 10))
        .await;

    match outcome {
        HandlerOutcome::Completed(OutcomeDetail::Stopped(summary)) => {
            assert_eq!(summary.total_tasks, 3);
            assert_eq!(summary.succeeded, 1);
            assert_eq!(summary.processed_topics, 1);
            assert_eq!(summary.skipped_topics, 1);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(harness.fakes.sandbox.interrupted_task_ids(), vec![81]);
    assert_eq!(
        other.current_owner("stop:7").await.as_deref(),
        Some("other-instance")
    );
}

#[tokio::test]
async fn test_concurrent_stop_of_same_topic_runs_once() {
    let harness = Harness::new();
    harness.fakes.tasks.insert(running_task(1, 7));
    let gate = Gate::closed();
    harness.fakes.sandbox.block_on(gate.clone());

    let registry = harness.system.registry();
    let first = tokio::spawn({
        let registry = Arc::clone(&registry);
        async move { registry.dispatch(&stop(ScopeType::Topic, 7)).await }
    });
    gate.wait_for_entered(1).await;

    let second = registry.dispatch(&stop(ScopeType::Topic, 7)).await;
    assert_eq!(
        second,
        HandlerOutcome::Skipped(SkipReason::AllTopicsContended { topics: 1 })
    );

    gate.open();
    assert!(first.await.unwrap().is_completed());
    assert_eq!(harness.fakes.sandbox.calls().len(), 1);
    assert_eq!(harness.fakes.sandbox.max_concurrent_interrupts(), 1);
}

#[tokio::test]
async fn test_topic_groups_run_with_bounded_parallelism() {
    let mut config = test_config();
    config.stop_task.max_concurrent_topics = 2;
    let harness = Harness::with_config(config);

    for topic_id in 1..=6 {
        harness.fakes.topics.insert(topic(topic_id, 10, 100));
        harness.fakes.tasks.insert(running_task(topic_id * 10, topic_id));
    }
    harness.fakes.sandbox.set_delay(Duration::from_millis(20));

    let outcome = harness
        .system
        .registry()
        .dispatch(&stop(ScopeType::Workspace, 100))
        .await;

    assert!(outcome.is_completed());
    assert_eq!(harness.fakes.sandbox.calls().len(), 6);
    assert!(harness.fakes.sandbox.max_concurrent_interrupts() <= 2);
}

#[tokio::test]
async fn test_malformed_stop_request_is_rejected() {
    let harness = Harness::new();
    harness.fakes.tasks.insert(running_task(1, 7));

    let message = InboundMessage::new(
        MessageType::StopRequest,
        json!({"eventId": "evt-9", "scopeType": "topic", "scopeId": 7}),
    );
    let outcome = harness.system.registry().dispatch(&message).await;

    match outcome {
        HandlerOutcome::Rejected(reason) => {
            assert!(reason.contains("userId"));
            assert!(reason.contains("organizationCode"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(harness.fakes.sandbox.calls().is_empty());
}

#[tokio::test]
async fn test_scope_without_running_tasks_is_skipped() {
    let harness = Harness::new();
    harness.fakes.topics.insert(topic(1, 10, 100));

    let outcome = harness
        .system
        .registry()
        .dispatch(&stop(ScopeType::Project, 10))
        .await;
    assert_eq!(outcome, HandlerOutcome::Skipped(SkipReason::NoRunningTasks));
}
