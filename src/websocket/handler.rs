//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::broadcaster::UpdateBroadcaster;
use crate::api::AppState;

/// WebSocket upgrade handler
///
/// Accepts connections from any origin; every connection receives every
/// broadcast batch.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let broadcaster = Arc::clone(&state.broadcaster);
    let send_timeout = Duration::from_secs(broadcaster.config().send_timeout_secs.max(1));
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster, send_timeout))
}

/// Handle an established WebSocket connection
async fn handle_socket(
    socket: WebSocket,
    broadcaster: Arc<UpdateBroadcaster>,
    send_timeout: Duration,
) {
    let (mut sender, mut receiver) = socket.split();

    // Create channel for sending batches to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let subscriber_id = match broadcaster.subscribe(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected WebSocket subscriber");
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    let id_for_send = subscriber_id.clone();

    // Task to forward batches from channel to WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            match tokio::time::timeout(send_timeout, sender.send(Message::Text(payload))).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::debug!(
                        subscriber_id = %id_for_send,
                        error = %e,
                        "WebSocket send failed, closing connection"
                    );
                    break;
                }
                Err(_) => {
                    tracing::warn!(
                        subscriber_id = %id_for_send,
                        "WebSocket send timed out, closing connection"
                    );
                    break;
                }
            }
        }
    });

    let id_for_recv = subscriber_id.clone();

    // Task to drain inbound frames until the client goes away
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    tracing::debug!(subscriber_id = %id_for_recv, "Client requested close");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(
                        subscriber_id = %id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    broadcaster.unsubscribe(&subscriber_id).await;
}
