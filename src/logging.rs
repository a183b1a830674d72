//! # Structured Logging Module
//!
//! Environment-aware structured logging for the coordinator. Console output,
//! optionally JSON, filtered by `RUST_LOG` when set and otherwise by the
//! environment's default level.

use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{ConfigManager, LoggingConfig};
use crate::orchestration::outcome::HandlerOutcome;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let directive = config
            .level
            .clone()
            .unwrap_or_else(|| get_log_level(&environment).to_string());

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

        let layer = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .boxed()
        };

        // A global subscriber may already be installed by the embedding process
        if tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            level = %directive,
            json = config.json,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log one distributed-lock event
pub fn log_lock_operation(operation: &str, key: &str, owner: &str, status: &str) {
    tracing::debug!(
        operation = %operation,
        lock_key = %key,
        owner = %owner,
        status = %status,
        "🔒 LOCK_OPERATION"
    );
}

/// Log the classified result of a handler invocation
pub fn log_handler_outcome(handler: &str, correlation_id: &str, outcome: &HandlerOutcome) {
    match outcome {
        HandlerOutcome::Fatal(reason) => tracing::error!(
            handler = %handler,
            correlation_id = %correlation_id,
            outcome = outcome.label(),
            reason = %reason,
            "📋 HANDLER_OUTCOME"
        ),
        HandlerOutcome::Rejected(_) | HandlerOutcome::PartialFailure(_) => tracing::warn!(
            handler = %handler,
            correlation_id = %correlation_id,
            outcome = outcome.label(),
            detail = ?outcome,
            "📋 HANDLER_OUTCOME"
        ),
        _ => tracing::info!(
            handler = %handler,
            correlation_id = %correlation_id,
            outcome = outcome.label(),
            detail = ?outcome,
            "📋 HANDLER_OUTCOME"
        ),
    }
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig {
            level: Some("warn".to_string()),
            json: true,
        };
        init_structured_logging(&config);
        init_structured_logging(&config);
    }
}
