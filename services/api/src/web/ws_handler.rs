//! services/api/src/web/ws_handler.rs
//!
//! The entry point and control loop for a WebSocket connection. Each
//! connection subscribes to the store and forwards every change to the client.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{stream::StreamExt, Sink, SinkExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before taking the snapshot so no change slips between the two.
    let (mut events, snapshot) = {
        let store = app_state.store.lock().await;
        (store.subscribe(), store.snapshot())
    };

    // --- 1. Initial Snapshot ---
    if send_json(
        &mut sender,
        &ServerMessage::Snapshot { state: Box::new(snapshot) },
    )
    .await
    .is_err()
    {
        error!("Failed to send initial snapshot.");
        return;
    }

    // --- 2. Main Message Loop ---
    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::Resync) => {
                            let snapshot = app_state.store.lock().await.snapshot();
                            let msg = ServerMessage::Snapshot { state: Box::new(snapshot) };
                            if send_json(&mut sender, &msg).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Failed to deserialize client message: {}", e);
                            let msg = ServerMessage::Error { message: format!("Unrecognised message: {}", e) };
                            if send_json(&mut sender, &msg).await.is_err() {
                                break;
                            }
                        }
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    info!("Client sent close message.");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
                None => {
                    info!("Client disconnected.");
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if send_json(&mut sender, &ServerMessage::Event { event }).await.is_err() {
                        error!("Failed to forward store event.");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "WebSocket client lagged behind the store.");
                    if send_json(&mut sender, &ServerMessage::Lagged { skipped }).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("WebSocket connection closed.");
}

async fn send_json<S>(sender: &mut S, msg: &ServerMessage) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}
