//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hiroba_server::{
    domain::MessageRepository,
    infrastructure::{registry::ConnectionRegistry, repository::InMemoryMessageRepository},
    ui::{
        build_router, cors_layer, serve,
        state::{AppState, SessionSettings},
    },
};
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for a frame that is expected to arrive.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait before concluding that no frame is coming.
pub const SILENCE: Duration = Duration::from_millis(300);

/// Relay running in-process on an ephemeral port with an in-memory store.
pub struct TestServer {
    addr: SocketAddr,
    pub repository: Arc<InMemoryMessageRepository>,
    pub registry: Arc<ConnectionRegistry>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(SessionSettings::default(), "*").await
    }

    pub async fn start_with(settings: SessionSettings, frontend_url: &str) -> Self {
        Self::start_with_store(settings, frontend_url, |repository| repository).await
    }

    /// Start with the in-memory store wrapped by `wrap` (e.g. to inject latency).
    /// `repository` still points at the underlying in-memory store.
    pub async fn start_with_store<F>(settings: SessionSettings, frontend_url: &str, wrap: F) -> Self
    where
        F: FnOnce(Arc<dyn MessageRepository>) -> Arc<dyn MessageRepository>,
    {
        let repository = Arc::new(InMemoryMessageRepository::new());
        let registry = Arc::new(ConnectionRegistry::with_delivery_timeout(
            Duration::from_secs(1),
        ));
        let store = wrap(repository.clone());
        let state = Arc::new(AppState::new(store, registry.clone(), settings));
        let app = build_router(state, cors_layer(frontend_url).expect("valid origin"));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let handle = tokio::spawn(async move {
            let _ = serve(listener, app).await;
        });

        Self {
            addr,
            repository,
            registry,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Open a WebSocket and wait until the server has registered it.
    pub async fn connect(&self) -> WsClient {
        let expected = self.registry.connection_count() + 1;
        let (ws, _response) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect WebSocket");
        self.wait_for_connections(expected).await;
        ws
    }

    /// Wait until exactly `count` connections are registered.
    pub async fn wait_for_connections(&self, count: usize) {
        tokio::time::timeout(RECV_TIMEOUT, async {
            while self.registry.connection_count() != count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "expected {count} connections, found {}",
                self.registry.connection_count()
            )
        });
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn send_json(ws: &mut WsClient, value: serde_json::Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send frame");
}

pub async fn send_text(ws: &mut WsClient, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Next text frame as JSON, skipping control frames.
pub async fn recv_json(ws: &mut WsClient) -> serde_json::Value {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(text.as_str()).expect("frame is JSON");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("expected a text frame, got {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a frame")
}

/// Assert that no text frame arrives within [`SILENCE`].
pub async fn expect_silence(ws: &mut WsClient) {
    if let Ok(Some(Ok(Message::Text(text)))) = tokio::time::timeout(SILENCE, ws.next()).await {
        panic!("unexpected frame: {text}");
    }
}

/// Whether the server closes the connection within [`RECV_TIMEOUT`].
pub async fn closed_by_server(ws: &mut WsClient) -> bool {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match ws.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return true,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await
    .unwrap_or(false)
}
