//! Completion notification gating and graceful degradation of display lookups.

mod common;

use serde_json::json;

use common::{task_callback, Harness};
use topic_coordinator::messaging::InboundMessage;
use topic_coordinator::models::TopicMode;
use topic_coordinator::orchestration::{HandlerOutcome, OutcomeDetail, SkipReason};
use topic_coordinator::services::CollaboratorError;
use topic_coordinator::test_helpers::{summary_topic, topic, user_message};

fn callback(status: &str) -> InboundMessage {
    InboundMessage::task_callback(&task_callback(5, 9, status)).unwrap()
}

/// Topic 5 in summary mode, with the user's message for task 9 marked
fn summary_harness() -> Harness {
    let harness = Harness::new();
    harness.fakes.topics.insert(summary_topic(5, 10, 100));
    harness
        .fakes
        .messages
        .insert(user_message(5, 9, json!({"summary_task": true, "content": "summarize"})));
    harness.fakes.directory.set_project_name(10, "Roadmap");
    harness.fakes.directory.set_workspace_name(100, "Acme");
    harness
}

#[tokio::test]
async fn test_running_status_produces_no_push() {
    let harness = summary_harness();
    let outcome = harness.system.registry().dispatch(&callback("running")).await;

    assert_eq!(
        outcome,
        HandlerOutcome::Skipped(SkipReason::NonTerminalStatus {
            status: "running".to_string()
        })
    );
    assert_eq!(harness.fakes.channel.push_count(), 0);
}

#[tokio::test]
async fn test_finished_without_marker_produces_no_push() {
    let harness = Harness::new();
    harness.fakes.topics.insert(summary_topic(5, 10, 100));
    harness
        .fakes
        .messages
        .insert(user_message(5, 9, json!({"content": "hello"})));

    let outcome = harness.system.registry().dispatch(&callback("finished")).await;
    assert_eq!(outcome, HandlerOutcome::Skipped(SkipReason::NoSummaryMarker));
    assert_eq!(harness.fakes.channel.push_count(), 0);
}

#[tokio::test]
async fn test_finished_with_marker_in_summary_topic_pushes_once() {
    let harness = summary_harness();
    let outcome = harness.system.registry().dispatch(&callback("finished")).await;

    assert_eq!(
        outcome,
        HandlerOutcome::Completed(OutcomeDetail::Notified {
            routing_id: "route-user-1".to_string(),
            success: true
        })
    );

    let pushes = harness.fakes.channel.pushes();
    assert_eq!(pushes.len(), 1);
    let push = &pushes[0];
    assert_eq!(push.routing_id, "route-user-1");
    assert_eq!(push.event, "summary_task_completed");
    assert_eq!(push.payload["success"], json!(true));
    assert_eq!(push.payload["workspaceId"], json!(100));
    assert_eq!(push.payload["workspaceName"], json!("Acme"));
    assert_eq!(push.payload["projectId"], json!(10));
    assert_eq!(push.payload["projectName"], json!("Roadmap"));
    assert_eq!(push.payload["topicId"], json!(5));
    assert_eq!(push.payload["organizationCode"], json!("org-1"));
    assert!(push.payload["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_non_summary_topic_produces_no_push() {
    let harness = Harness::new();
    harness.fakes.topics.insert(topic(5, 10, 100));
    harness
        .fakes
        .messages
        .insert(user_message(5, 9, json!({"summary_task": true})));

    let outcome = harness.system.registry().dispatch(&callback("finished")).await;
    assert_eq!(
        outcome,
        HandlerOutcome::Skipped(SkipReason::TopicModeMismatch {
            mode: TopicMode::General
        })
    );
    assert_eq!(harness.fakes.channel.push_count(), 0);
}

#[tokio::test]
async fn test_failed_name_lookups_degrade_to_empty_names() {
    let harness = summary_harness();
    harness
        .fakes
        .directory
        .fail_names(CollaboratorError::unavailable("directory", "timeout"));

    let outcome = harness.system.registry().dispatch(&callback("finished")).await;
    assert!(outcome.is_completed());

    let pushes = harness.fakes.channel.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].payload["projectName"], json!(""));
    assert_eq!(pushes[0].payload["workspaceName"], json!(""));
}

#[tokio::test]
async fn test_panicking_name_lookups_degrade_to_empty_names() {
    let harness = summary_harness();
    harness.fakes.directory.panic_on_names();

    let outcome = harness.system.registry().dispatch(&callback("error")).await;
    assert!(outcome.is_completed());

    let pushes = harness.fakes.channel.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].payload["success"], json!(false));
    assert_eq!(pushes[0].payload["projectName"], json!(""));
}

#[tokio::test]
async fn test_message_store_outage_is_fatal_but_handled() {
    let harness = summary_harness();
    harness.fakes.messages.set_unavailable(true);

    let outcome = harness.system.registry().dispatch(&callback("finished")).await;
    assert!(matches!(outcome, HandlerOutcome::Fatal(_)));
    assert_eq!(harness.fakes.channel.push_count(), 0);
}
