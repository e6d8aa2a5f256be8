//! WebSocket connection handlers and the HTTP API surface.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::common::time::timestamp_to_jst_rfc3339;
use crate::protocol::ClientEvent;

use super::registry::{ConnectionHandle, ConnectionId};
use super::router::EventRouter;
use super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Drive one participant's connection until the transport closes.
///
/// The socket is split into a receive task (inbound frames, routed through
/// the [`EventRouter`]) and a send task (events relayed from other room
/// members, delivered in channel order). When either task ends the other is
/// aborted and the connection's membership is removed before this function
/// returns, so no further broadcast can target the dead handle.
pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = ConnectionHandle::new(ConnectionId::generate(), tx);
    let conn_id = handle.id();
    tracing::info!("Connection '{}' established", conn_id);

    let router = EventRouter::new(state);
    let recv_router = router.clone();

    // Receive frames from this participant and route them
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", conn_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => recv_router.dispatch(&handle, event).await,
                    Err(e) => {
                        tracing::warn!("Dropping unparseable frame from '{}': {}", conn_id, e);
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", conn_id);
                    break;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping from '{}'", conn_id);
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                _ => {}
            }
        }
    });

    // Deliver events relayed from other room members to this participant
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event for '{}': {}", conn_id, e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // If either task completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Membership must be gone before any further event is routed
    router.on_disconnect(conn_id).await;
    tracing::info!("Connection '{}' disconnected", conn_id);
}

#[derive(Debug, Serialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub members: usize,
    pub created_at: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// List active rooms with member counts
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let registry = state.registry.lock().await;

    let rooms = registry
        .room_summaries()
        .into_iter()
        .map(|summary| RoomSummaryDto {
            id: summary.id,
            members: summary.members,
            created_at: timestamp_to_jst_rfc3339(summary.created_at),
        })
        .collect();

    Json(rooms)
}
