//! Per-connection session loop.
//!
//! A session registers its connection, then handles inbound frames strictly
//! in receipt order: parse, validate, persist, broadcast. Whatever ends the
//! loop, the connection is deregistered before `run` returns, and the
//! failure stays contained to this one connection.

use std::{fmt, panic::AssertUnwindSafe, sync::Arc};

use futures_util::{FutureExt, Stream, StreamExt};

use crate::{
    domain::{ConnectionId, MessageRepository, RepositoryError},
    infrastructure::{
        dto::websocket::InboundMessage,
        registry::{ConnectionRegistry, ConnectionSink},
    },
};

use super::{
    ConnectSessionUseCase, DisconnectSessionUseCase, SendMessageUseCase,
    error::{MalformedInput, SendMessageError},
};

/// A frame received from the transport, reduced to what the session cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// A text frame carrying a JSON payload
    Text(String),
    /// The client asked to close the connection
    Close,
}

/// What to do with a frame that is not a `{username?, content}` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MalformedInputPolicy {
    /// End the session (the relay's historical behavior)
    #[default]
    Disconnect,
    /// Log and wait for the next frame
    Skip,
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Close frame received or the inbound stream finished
    Closed,
    /// A malformed frame arrived under [`MalformedInputPolicy::Disconnect`]
    MalformedInput(MalformedInput),
    /// A message could not be stored
    PersistenceFailed(RepositoryError),
    /// The transport reported a receive error
    TransportError(String),
    /// Any other failure inside the loop
    Failed(String),
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::Closed => write!(f, "closed"),
            SessionEnd::MalformedInput(e) => write!(f, "{e}"),
            SessionEnd::PersistenceFailed(e) => write!(f, "{e}"),
            SessionEnd::TransportError(e) => write!(f, "transport error: {e}"),
            SessionEnd::Failed(e) => write!(f, "session failed: {e}"),
        }
    }
}

/// Parse an inbound text frame.
///
/// The payload must be a JSON object; `username` is optional, and a missing
/// or null `content` reads as empty. Anything else is [`MalformedInput`].
pub fn parse_inbound(text: &str) -> Result<InboundMessage, MalformedInput> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| MalformedInput(e.to_string()))?;
    if !value.is_object() {
        return Err(MalformedInput("expected a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| MalformedInput(e.to_string()))
}

/// Drives one client's session from accept to teardown.
pub struct SessionHandler {
    connect: ConnectSessionUseCase,
    disconnect: DisconnectSessionUseCase,
    send_message: SendMessageUseCase,
    policy: MalformedInputPolicy,
}

impl SessionHandler {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        registry: Arc<ConnectionRegistry>,
        policy: MalformedInputPolicy,
    ) -> Self {
        Self {
            connect: ConnectSessionUseCase::new(registry.clone()),
            disconnect: DisconnectSessionUseCase::new(registry.clone()),
            send_message: SendMessageUseCase::new(repository, registry),
            policy,
        }
    }

    /// Register `sink` under `connection_id`, process `frames` until the
    /// session ends, then deregister.
    pub async fn run<S, E>(
        &self,
        connection_id: ConnectionId,
        sink: Arc<dyn ConnectionSink>,
        mut frames: S,
    ) -> SessionEnd
    where
        S: Stream<Item = Result<InboundFrame, E>> + Unpin,
        E: fmt::Display,
    {
        self.connect.execute(connection_id, sink).await;

        let end = AssertUnwindSafe(self.receive_loop(connection_id, &mut frames))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| SessionEnd::Failed("session loop panicked".to_string()));

        match &end {
            SessionEnd::Closed => tracing::info!(%connection_id, "client disconnected"),
            SessionEnd::MalformedInput(e) => {
                tracing::warn!(%connection_id, error = %e, "closing connection on malformed input")
            }
            other => tracing::error!(%connection_id, reason = %other, "session error"),
        }

        self.disconnect.execute(&connection_id).await;
        end
    }

    async fn receive_loop<S, E>(&self, connection_id: ConnectionId, frames: &mut S) -> SessionEnd
    where
        S: Stream<Item = Result<InboundFrame, E>> + Unpin,
        E: fmt::Display,
    {
        while let Some(frame) = frames.next().await {
            let text = match frame {
                Ok(InboundFrame::Text(text)) => text,
                Ok(InboundFrame::Close) => return SessionEnd::Closed,
                Err(e) => return SessionEnd::TransportError(e.to_string()),
            };
            tracing::debug!(%connection_id, %text, "received message");

            let inbound = match parse_inbound(&text) {
                Ok(inbound) => inbound,
                Err(e) => match self.policy {
                    MalformedInputPolicy::Disconnect => return SessionEnd::MalformedInput(e),
                    MalformedInputPolicy::Skip => {
                        tracing::warn!(%connection_id, error = %e, "skipping malformed input");
                        continue;
                    }
                },
            };

            match self.send_message.execute(inbound).await {
                Ok(Some(sent)) => tracing::info!(
                    %connection_id,
                    message_id = %sent.message.id,
                    delivered = sent.report.delivered,
                    "saved and broadcast message"
                ),
                Ok(None) => tracing::debug!(%connection_id, "dropped message with empty content"),
                Err(SendMessageError::Persistence(e)) => return SessionEnd::PersistenceFailed(e),
                Err(e) => return SessionEnd::Failed(e.to_string()),
            }
        }
        SessionEnd::Closed
    }
}
