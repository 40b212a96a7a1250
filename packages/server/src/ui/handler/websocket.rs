//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::oneshot;

use crate::{
    domain::ConnectionIdFactory,
    infrastructure::registry::ChannelSink,
    ui::state::AppState,
    usecase::{InboundFrame, SessionHandler},
};

/// How long the writer may keep flushing after the session has ended.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionIdFactory::generate();
    let (mut sender, receiver) = socket.split();
    let (sink, mut rx) = ChannelSink::channel(state.settings.outbound_buffer);
    let (writer_done_tx, writer_done_rx) = oneshot::channel::<()>();
    tracing::info!(%connection_id, "client connected");

    // Writer: drain broadcasts into the socket until every sink clone is gone
    // or the socket stops accepting writes.
    let mut send_task = tokio::spawn(async move {
        // Dropped when the writer exits, which ends the inbound stream below.
        let _writer_done = writer_done_tx;
        while let Some(payload) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(payload.to_string().into())).await {
                tracing::warn!(%connection_id, "Failed to write to client: {}", e);
                return;
            }
        }
        let _ = sender.close().await;
    });

    // A dead writer stops the session from reading further frames, but a
    // message already being processed is still stored and broadcast.
    let frames = receiver
        .filter_map(|msg| async move {
            match msg {
                Ok(Message::Text(text)) => Some(Ok(InboundFrame::Text(text.as_str().to_owned()))),
                Ok(Message::Close(_)) => Some(Ok(InboundFrame::Close)),
                // Ping/pong is handled by the WebSocket protocol; binary frames are not part of the chat protocol
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            }
        })
        .take_until(writer_done_rx);
    let frames = std::pin::pin!(frames);

    let handler = SessionHandler::new(
        state.repository.clone(),
        state.registry.clone(),
        state.settings.malformed_policy,
    );

    // `run` deregisters the connection before returning.
    let end = handler.run(connection_id, Arc::new(sink), frames).await;
    tracing::debug!(%connection_id, reason = %end, "session finished");

    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut send_task)
        .await
        .is_err()
    {
        send_task.abort();
    }
}
