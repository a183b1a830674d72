//! Lock store error types

use thiserror::Error;

/// Errors that can occur while talking to the coordination store
#[derive(Debug, Error)]
pub enum LockError {
    /// Failed to connect to the store
    #[error("Lock store connection error: {0}")]
    ConnectionError(String),

    /// Store reachable but the command failed
    #[error("Lock store backend error: {0}")]
    BackendError(String),

    /// The selected backend cannot be built in this configuration
    #[error("Lock store configuration error: {0}")]
    Configuration(String),
}

/// Result type for lock store operations
pub type LockResult<T> = Result<T, LockError>;
