//! # Message Structures
//!
//! The unit handed from a sender to an executor. The transport core never
//! looks inside a message; executors decide what the payload means.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Message forwarded to the active executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id
    pub message_id: Uuid,
    /// Optional domain type (e.g. "sensor.reading")
    pub message_type: Option<String>,
    /// Message body
    pub payload: serde_json::Value,
    /// Message metadata
    pub metadata: MessageMetadata,
}

/// Metadata for messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// When the message was created
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Free-form headers supplied by the producer
    pub headers: HashMap<String, String>,
}

impl Default for MessageMetadata {
    fn default() -> Self {
        Self {
            created_at: chrono::Utc::now(),
            headers: HashMap::new(),
        }
    }
}

impl Message {
    /// Create a new message
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            message_type: None,
            payload,
            metadata: MessageMetadata::default(),
        }
    }

    /// Tag the message with a domain type
    pub fn with_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    /// Attach a header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.headers.insert(key.into(), value.into());
        self
    }

    /// Convert to JSON
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Get message age in milliseconds
    pub fn age_ms(&self) -> u64 {
        chrono::Utc::now()
            .signed_duration_since(self.metadata.created_at)
            .num_milliseconds()
            .max(0) as u64
    }
}
