//! # Inbound Message Envelope
//!
//! Every broker message and in-process domain event arrives wrapped in an
//! [`InboundMessage`]: a type tag the registry dispatches on, a correlation id
//! carried through the handler's logs, and the untyped JSON payload the
//! handler decodes itself.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::{MessagingError, MessagingResult};
use crate::models::{QueueDrainTrigger, StopRequest, TaskCallback};

/// The three inbound shapes the coordinator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    QueueDrainTrigger,
    StopRequest,
    TaskCallback,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::QueueDrainTrigger => "queue_drain_trigger",
            MessageType::StopRequest => "stop_request",
            MessageType::TaskCallback => "task_callback",
        }
    }

    pub fn all() -> [MessageType; 3] {
        [
            MessageType::QueueDrainTrigger,
            MessageType::StopRequest,
            MessageType::TaskCallback,
        ]
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = MessagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queue_drain_trigger" => Ok(MessageType::QueueDrainTrigger),
            "stop_request" => Ok(MessageType::StopRequest),
            "task_callback" => Ok(MessageType::TaskCallback),
            other => Err(MessagingError::unknown_message_type(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Broker-assigned id, or a generated one for in-process events
    pub message_id: String,
    pub correlation_id: Uuid,
    pub message_type: MessageType,
    pub payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        let correlation_id = Uuid::new_v4();
        Self {
            message_id: correlation_id.to_string(),
            correlation_id,
            message_type,
            payload,
            received_at: Utc::now(),
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = message_id.into();
        self
    }

    pub fn queue_drain_trigger(trigger: &QueueDrainTrigger) -> MessagingResult<Self> {
        Ok(Self::new(MessageType::QueueDrainTrigger, serde_json::to_value(trigger)?))
    }

    pub fn stop_request(request: &StopRequest) -> MessagingResult<Self> {
        Ok(Self::new(MessageType::StopRequest, serde_json::to_value(request)?))
    }

    pub fn task_callback(callback: &TaskCallback) -> MessagingResult<Self> {
        Ok(Self::new(MessageType::TaskCallback, serde_json::to_value(callback)?))
    }

    /// Decode the payload into the shape the handler expects
    pub fn decode<T: DeserializeOwned>(&self) -> MessagingResult<T> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            MessagingError::message_deserialization(format!(
                "{} payload of message {}: {}",
                self.message_type, self.message_id, e
            ))
        })
    }

    /// Parse a raw broker body of the form `{"type": "...", "payload": {...}}`
    pub fn from_json_bytes(message_id: impl Into<String>, bytes: &[u8]) -> MessagingResult<Self> {
        #[derive(Deserialize)]
        struct RawEnvelope {
            #[serde(rename = "type")]
            message_type: String,
            #[serde(default)]
            payload: serde_json::Value,
            #[serde(default)]
            correlation_id: Option<Uuid>,
        }

        let raw: RawEnvelope = serde_json::from_slice(bytes)?;
        let message_type = raw.message_type.parse::<MessageType>()?;
        Ok(Self {
            message_id: message_id.into(),
            correlation_id: raw.correlation_id.unwrap_or_else(Uuid::new_v4),
            message_type,
            payload: raw.payload,
            received_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_type_parsing() {
        for message_type in MessageType::all() {
            assert_eq!(message_type.as_str().parse::<MessageType>().unwrap(), message_type);
        }
        assert!(matches!(
            "task_finished".parse::<MessageType>(),
            Err(MessagingError::UnknownMessageType { .. })
        ));
    }

    #[test]
    fn test_typed_constructor_decodes_back() {
        let message = InboundMessage::queue_drain_trigger(&QueueDrainTrigger::new(5, 9)).unwrap();
        assert_eq!(message.message_type, MessageType::QueueDrainTrigger);
        assert_eq!(message.payload, json!({"topicId": 5, "taskId": 9}));

        let trigger: QueueDrainTrigger = message.decode().unwrap();
        assert_eq!(trigger, QueueDrainTrigger::new(5, 9));
    }

    #[test]
    fn test_decode_wrong_shape_is_deserialization_error() {
        let message = InboundMessage::new(MessageType::StopRequest, json!({"scopeId": "twelve"}));
        let err = message.decode::<StopRequest>().unwrap_err();
        assert!(matches!(err, MessagingError::MessageDeserialization { .. }));
    }

    #[test]
    fn test_from_json_bytes_keeps_correlation_id() {
        let correlation_id = Uuid::new_v4();
        let body = json!({
            "type": "task_callback",
            "correlation_id": correlation_id,
            "payload": {"taskId": 1, "topicId": 2, "userId": "u", "status": "finished"}
        });
        let bytes = serde_json::to_vec(&body).unwrap();

        let message = InboundMessage::from_json_bytes("m-1", &bytes).unwrap();
        assert_eq!(message.message_id, "m-1");
        assert_eq!(message.correlation_id, correlation_id);
        assert_eq!(message.message_type, MessageType::TaskCallback);
    }

    #[test]
    fn test_from_json_bytes_rejects_unknown_type() {
        let bytes = br#"{"type": "mystery", "payload": {}}"#;
        assert!(InboundMessage::from_json_bytes("m-2", bytes).is_err());
    }
}
