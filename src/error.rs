//! # Crate Error Types
//!
//! Top-level error type for the coordinator. Layer-specific errors
//! (`LockError`, `CollaboratorError`, `MessagingError`, `ConfigurationError`)
//! convert into it so bootstrap code can use a single `Result`.

use thiserror::Error;

use crate::config::ConfigurationError;
use crate::locking::LockError;
use crate::messaging::MessagingError;
use crate::services::CollaboratorError;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Lock store error: {0}")]
    Lock(#[from] LockError),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;
