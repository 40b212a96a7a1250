//! WebSocket chat relay server implementation.

mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{build_router, cors_layer, open_repository, run, serve};
