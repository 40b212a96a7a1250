//! HTTP API response DTOs for the chat relay.

use serde::{Deserialize, Serialize};

use hiroba_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::Message;

/// A persisted message as sent over the wire (history and live broadcast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: i64,
    pub username: String,
    pub content: String,
    pub created_at: String, // ISO 8601
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.value(),
            username: message.username.as_str().to_string(),
            content: message.content.as_str().to_string(),
            created_at: timestamp_to_jst_rfc3339(message.created_at.value()),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
