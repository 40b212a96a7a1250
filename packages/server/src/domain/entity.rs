//! Core domain models for the chat relay.

use serde::{Deserialize, Serialize};

use super::value_object::{MessageContent, MessageId, Timestamp, Username};

/// A persisted chat message.
///
/// Identity and creation time are assigned by the message store; a message is
/// never mutated after it has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier assigned by the store
    pub id: MessageId,
    /// Display name of the sender
    pub username: Username,
    /// Message content
    pub content: MessageContent,
    /// Timestamp assigned by the store when the message was persisted
    pub created_at: Timestamp,
}

impl Message {
    /// Create a message from its stored parts
    pub fn new(
        id: MessageId,
        username: Username,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            username,
            content,
            created_at,
        }
    }
}

/// Sort messages into history order: `created_at` ascending, ties broken by `id`.
pub fn sort_chronologically(messages: &mut [Message]) {
    messages.sort_by_key(|m| (m.created_at, m.id));
}
