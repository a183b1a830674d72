//! Errors raised by external collaborators

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("{service} unavailable: {message}")]
    Unavailable { service: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The sandbox refused or failed to process an interrupt
    #[error("sandbox {sandbox_id} error: {message}")]
    Sandbox { sandbox_id: String, message: String },

    #[error("{operation} failed: {message}")]
    Operation { operation: String, message: String },
}

impl CollaboratorError {
    pub fn unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn sandbox(sandbox_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sandbox {
            sandbox_id: sandbox_id.into(),
            message: message.into(),
        }
    }

    pub fn operation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;
