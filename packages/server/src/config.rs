//! Process configuration from command-line flags and environment variables.

use std::time::Duration;

use clap::Parser;

use crate::usecase::MalformedInputPolicy;

/// Store location that selects the in-memory repository instead of SQLite.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Chat relay server settings.
#[derive(Debug, Clone, Parser)]
#[command(name = "hiroba-server", version, about = "Real-time chat relay over WebSocket")]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Allowed cross-origin caller; `*` allows any origin
    #[arg(long, env = "FRONTEND_URL", default_value = "*")]
    pub frontend_url: String,

    /// SQLite database file, or `:memory:` for a non-durable store
    #[arg(long, env = "DATABASE_PATH", default_value = "hiroba.db")]
    pub database: String,

    /// Upper bound on delivering one broadcast to one client
    #[arg(long, env = "DELIVERY_TIMEOUT_MS", default_value_t = 5000)]
    pub delivery_timeout_ms: u64,

    /// Outbound frames buffered per client before delivery waits
    #[arg(long, env = "OUTBOUND_BUFFER", default_value_t = 64)]
    pub outbound_buffer: usize,

    /// What to do when a client sends a frame that is not a message record
    #[arg(long, env = "ON_MALFORMED", value_enum, default_value_t = MalformedInputPolicy::Disconnect)]
    pub on_malformed: MalformedInputPolicy,
}

impl Config {
    /// `host:port` to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}
