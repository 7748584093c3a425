use crate::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use topic_chat_core::ChatSession;
use topic_chat_types::ServerEvent;
use tracing::{debug, error, info, warn};

/// Capacity of each connection's outgoing event queue.
const OUTBOUND_CAPACITY: usize = 32;

/// Handles WebSocket upgrade requests.
///
/// The upgraded socket is handed to `handle_socket`, which runs for the
/// lifetime of the connection.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    debug!("WebSocket upgrade request received");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manages an individual WebSocket connection.
///
/// Outgoing events are serialized by a dedicated writer task so that a
/// handler's replies reach the client in the order they were emitted.
/// Incoming frames are handled one at a time.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let id = uuid::Uuid::new_v4().to_string();
    let (mut write, mut read) = socket.split();
    let (client_tx, mut client_rx) = tokio::sync::mpsc::channel::<ServerEvent>(OUTBOUND_CAPACITY);

    let writer_id = id.clone();
    let writer = tokio::spawn(async move {
        while let Some(event) = client_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(text) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        debug!("Client {} stopped accepting messages: {}", writer_id, e);
                        break;
                    }
                }
                Err(e) => {
                    error!("failed to serialize event: {}", e);
                }
            }
        }
    });

    let session = ChatSession::new(id.clone(), state.generator.clone(), client_tx);
    session.on_connect().await;

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => session.handle_frame(text.as_str()).await,
            Ok(Message::Binary(_)) => {
                warn!("Ignoring binary frame from client {}", id);
            }
            Ok(Message::Close(_)) => break,
            // Ping/Pong are answered by axum.
            Ok(_) => {}
            Err(e) => {
                info!("WebSocket error for client {}: {}", id, e);
                break;
            }
        }
    }

    // Dropping the session closes the event queue, which ends the writer.
    session.on_disconnect();
    if let Err(e) = writer.await {
        error!("Writer task for client {} failed: {}", id, e);
    }
}
