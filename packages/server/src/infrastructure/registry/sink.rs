//! Outbound side of a connection as seen by the registry.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Why a payload could not be handed to a connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The connection's writer has gone away
    #[error("connection closed")]
    Closed,

    /// The connection did not accept the payload in time
    #[error("delivery timed out after {0:?}")]
    TimedOut(Duration),

    /// The transport reported a write error
    #[error("transport error: {0}")]
    Transport(String),
}

/// Something a broadcast can be written to.
///
/// The registry never checks whether a sink is open before delivering;
/// a failed `deliver` is the signal that the connection is gone.
#[async_trait]
pub trait ConnectionSink: Send + Sync {
    async fn deliver(&self, payload: Arc<str>) -> Result<(), DeliveryError>;
}

/// Sink backed by a bounded channel drained by the connection's writer task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<Arc<str>>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<Arc<str>>) -> Self {
        Self { sender }
    }

    /// Create a sink and the receiver its writer task should drain.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl ConnectionSink for ChannelSink {
    async fn deliver(&self, payload: Arc<str>) -> Result<(), DeliveryError> {
        self.sender
            .send(payload)
            .await
            .map_err(|_| DeliveryError::Closed)
    }
}
