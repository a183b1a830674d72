//! # Handler Outcome Classification
//!
//! Every handler converts whatever happened during an invocation into a
//! [`HandlerOutcome`]. Nothing is raised past the handler: all variants are
//! acknowledged to the broker, and the variant tells logs, stats and tests
//! which class of result occurred.
//!
//! | variant | meaning |
//! |---|---|
//! | `Completed` | the work ran |
//! | `Skipped` | expected short-circuit (lock contention, nothing to do) |
//! | `PartialFailure` | some isolated sub-operations failed |
//! | `Rejected` | malformed input, never retried |
//! | `Fatal` | unexpected failure, logged and swallowed |

use serde::Serialize;
use std::fmt;

use crate::models::TopicMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum HandlerOutcome {
    Completed(OutcomeDetail),
    Skipped(SkipReason),
    PartialFailure(StopSummary),
    Rejected(String),
    Fatal(String),
}

impl HandlerOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            HandlerOutcome::Completed(_) => "completed",
            HandlerOutcome::Skipped(_) => "skipped",
            HandlerOutcome::PartialFailure(_) => "partial_failure",
            HandlerOutcome::Rejected(_) => "rejected",
            HandlerOutcome::Fatal(_) => "fatal",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, HandlerOutcome::Completed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, HandlerOutcome::Skipped(_))
    }

    /// Whether anything went wrong, as opposed to an expected skip
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            HandlerOutcome::PartialFailure(_) | HandlerOutcome::Rejected(_) | HandlerOutcome::Fatal(_)
        )
    }
}

impl fmt::Display for HandlerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerOutcome::Completed(detail) => write!(f, "completed: {detail:?}"),
            HandlerOutcome::Skipped(reason) => write!(f, "skipped: {reason}"),
            HandlerOutcome::PartialFailure(summary) => write!(
                f,
                "partial failure: {} succeeded, {} failed, {} topics skipped",
                summary.succeeded, summary.failed, summary.skipped_topics
            ),
            HandlerOutcome::Rejected(reason) => write!(f, "rejected: {reason}"),
            HandlerOutcome::Fatal(reason) => write!(f, "fatal: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeDetail {
    Drained { topic_id: i64, processed: u64 },
    Stopped(StopSummary),
    Notified { routing_id: String, success: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Another holder is already doing this work
    LockContended { key: String },
    /// Every topic group of a stop request was already being stopped
    AllTopicsContended { topics: usize },
    NoRunningTasks,
    NonTerminalStatus { status: String },
    NoSummaryMarker,
    TopicNotFound { topic_id: i64 },
    TopicModeMismatch { mode: TopicMode },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::LockContended { key } => write!(f, "lock {key} held by another owner"),
            SkipReason::AllTopicsContended { topics } => {
                write!(f, "all {topics} topic groups already being stopped")
            }
            SkipReason::NoRunningTasks => write!(f, "no running tasks in scope"),
            SkipReason::NonTerminalStatus { status } => write!(f, "status '{status}' is not terminal"),
            SkipReason::NoSummaryMarker => write!(f, "no user message carries the summary marker"),
            SkipReason::TopicNotFound { topic_id } => write!(f, "topic {topic_id} not found"),
            SkipReason::TopicModeMismatch { mode } => write!(f, "topic mode {mode:?} is not summary"),
        }
    }
}

/// One task whose interrupt failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterruptFailure {
    pub task_id: i64,
    pub topic_id: i64,
    pub error: String,
}

/// Aggregate of a stop request across all its topic groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StopSummary {
    pub total_tasks: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub processed_topics: usize,
    pub skipped_topics: usize,
    pub failures: Vec<InterruptFailure>,
}

/// Result of one topic group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicStopResult {
    Processed {
        topic_id: i64,
        succeeded: usize,
        failures: Vec<InterruptFailure>,
    },
    /// The topic's stop lock was held; none of its tasks were touched
    Skipped { topic_id: i64, task_count: usize },
}

impl StopSummary {
    pub fn from_results(results: impl IntoIterator<Item = TopicStopResult>) -> Self {
        let mut summary = StopSummary::default();
        for result in results {
            match result {
                TopicStopResult::Processed {
                    succeeded, failures, ..
                } => {
                    summary.processed_topics += 1;
                    summary.succeeded += succeeded;
                    summary.failed += failures.len();
                    summary.total_tasks += succeeded + failures.len();
                    summary.failures.extend(failures);
                }
                TopicStopResult::Skipped { task_count, .. } => {
                    summary.skipped_topics += 1;
                    summary.total_tasks += task_count;
                }
            }
        }
        summary
    }

    /// Map the aggregate to the handler classification
    pub fn into_outcome(self) -> HandlerOutcome {
        if self.failed > 0 {
            HandlerOutcome::PartialFailure(self)
        } else if self.processed_topics == 0 && self.skipped_topics > 0 {
            HandlerOutcome::Skipped(SkipReason::AllTopicsContended {
                topics: self.skipped_topics,
            })
        } else {
            HandlerOutcome::Completed(OutcomeDetail::Stopped(self))
        }
    }
}
