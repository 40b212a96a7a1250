//! Router assembly and server startup.

use std::sync::Arc;

use axum::{Router, http::HeaderValue, routing::get};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::{Config, IN_MEMORY_DATABASE},
    domain::MessageRepository,
    error::ServerError,
    infrastructure::{
        registry::ConnectionRegistry,
        repository::{InMemoryMessageRepository, SqliteMessageRepository},
    },
};

use super::{
    handler::{get_messages, health_check, root, websocket_handler},
    signal::shutdown_signal,
    state::{AppState, SessionSettings},
};

/// Start the chat relay with the given configuration and serve until shutdown.
pub async fn run(config: Config) -> Result<(), ServerError> {
    tracing::info!("{}", "=".repeat(60));
    tracing::info!("Starting chat relay");
    tracing::info!("Port: {}", config.port);
    tracing::info!("Allowed origins: {}", config.frontend_url);
    tracing::info!("Database: {}", config.database);
    tracing::info!("{}", "=".repeat(60));

    let repository = open_repository(&config.database)?;
    let registry = Arc::new(ConnectionRegistry::with_delivery_timeout(
        config.delivery_timeout(),
    ));
    let settings = SessionSettings {
        outbound_buffer: config.outbound_buffer,
        malformed_policy: config.on_malformed,
    };
    let state = Arc::new(AppState::new(repository, registry, settings));
    let app = build_router(state, cors_layer(&config.frontend_url)?);

    let listener = TcpListener::bind(config.addr()).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    serve(listener, app).await
}

/// Open the configured message store.
pub fn open_repository(database: &str) -> Result<Arc<dyn MessageRepository>, ServerError> {
    if database == IN_MEMORY_DATABASE {
        tracing::warn!("Using in-memory message store; history is lost on exit");
        return Ok(Arc::new(InMemoryMessageRepository::new()));
    }
    Ok(Arc::new(SqliteMessageRepository::open(database)?))
}

/// Build the CORS policy for the allowed origin.
///
/// `*` allows any origin without credentials; a concrete origin is allowed
/// with credentials.
pub fn cors_layer(frontend_url: &str) -> Result<CorsLayer, ServerError> {
    if frontend_url == "*" {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origin = HeaderValue::from_str(frontend_url)
        .map_err(|_| ServerError::InvalidOrigin(frontend_url.to_string()))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Assemble the HTTP and WebSocket routes.
pub fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/messages", get(get_messages))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve `app` on `listener` until a shutdown signal arrives.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServerError> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}
