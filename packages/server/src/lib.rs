//! WebSocket chat relay library.
//!
//! Clients connect over a WebSocket, send short text messages, and receive a
//! live broadcast of every stored message. History is kept in a durable
//! message store and served over HTTP.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::Config;
pub use error::ServerError;
pub use ui::run as run_server;
