//! Server state shared by all handlers.

use std::sync::Arc;

use crate::{
    domain::MessageRepository, infrastructure::registry::ConnectionRegistry,
    usecase::MalformedInputPolicy,
};

/// Per-connection session settings
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Outbound frames buffered per client
    pub outbound_buffer: usize,
    /// Handling of frames that are not message records
    pub malformed_policy: MalformedInputPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            outbound_buffer: 64,
            malformed_policy: MalformedInputPolicy::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Repository（データアクセス層の抽象化）
    pub repository: Arc<dyn MessageRepository>,
    /// Live connections for broadcasting
    pub registry: Arc<ConnectionRegistry>,
    pub settings: SessionSettings,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        registry: Arc<ConnectionRegistry>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            repository,
            registry,
            settings,
        }
    }
}
