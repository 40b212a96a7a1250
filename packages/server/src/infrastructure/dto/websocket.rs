//! WebSocket message DTOs for the chat relay.

use serde::{Deserialize, Serialize};

pub use super::http::MessageDto as OutboundMessage;

/// Frame sent by a client: `{ "username"?: string, "content"?: string }`.
///
/// A missing or null `content` reads as empty, which the relay drops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}
