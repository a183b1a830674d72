//! # Messaging Errors
//!
//! Failures on the ingress side: decoding envelopes, registering handlers,
//! and talking to the message source.

use thiserror::Error;

use super::message::MessageType;

#[derive(Debug, Clone, Error)]
pub enum MessagingError {
    #[error("Message deserialization error: {message}")]
    MessageDeserialization { message: String },

    #[error("Message serialization error: {message}")]
    MessageSerialization { message: String },

    #[error("Unknown message type: {type_name}")]
    UnknownMessageType { type_name: String },

    #[error("No handler registered for message type: {message_type}")]
    HandlerNotFound { message_type: MessageType },

    #[error("Handler already registered for message type: {message_type} ({existing})")]
    DuplicateHandler {
        message_type: MessageType,
        existing: String,
    },

    #[error("Message source error: {operation}: {message}")]
    Source { operation: String, message: String },

    #[error("Message source closed")]
    SourceClosed,
}

impl MessagingError {
    pub fn message_deserialization(message: impl Into<String>) -> Self {
        Self::MessageDeserialization {
            message: message.into(),
        }
    }

    pub fn message_serialization(message: impl Into<String>) -> Self {
        Self::MessageSerialization {
            message: message.into(),
        }
    }

    pub fn unknown_message_type(type_name: impl Into<String>) -> Self {
        Self::UnknownMessageType {
            type_name: type_name.into(),
        }
    }

    pub fn source(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Conversion from serde_json::Error to MessagingError
impl From<serde_json::Error> for MessagingError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() || err.is_eof() {
            MessagingError::message_deserialization(err.to_string())
        } else {
            MessagingError::message_serialization(err.to_string())
        }
    }
}

pub type MessagingResult<T> = Result<T, MessagingError>;
