//! WebSocket chat relay server.
//!
//! Stores every message sent by a client and broadcasts it to all connected clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server -- --port 8000
//! ```

use clap::Parser;
use hiroba_server::Config;
use hiroba_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    // Run the server
    if let Err(e) = hiroba_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
