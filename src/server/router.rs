//! Event router: the single entry point for inbound frames.
//!
//! Classifies each frame by event kind and dispatches to the matching
//! registry operation. Join requests are acknowledged with `roomJoined` or
//! `roomError`; stroke, clear, and chat frames are relayed payload-only to
//! the other members of the sender's current room. A frame that violates a
//! precondition (no current room, mismatched room field) is dropped
//! silently rather than faulting the connection.

use std::sync::Arc;

use crate::protocol::{ClientEvent, ServerEvent};

use super::registry::{ConnectionHandle, ConnectionId, RoomId};
use super::state::AppState;

#[derive(Debug, Clone)]
pub struct EventRouter {
    state: Arc<AppState>,
}

impl EventRouter {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Dispatch one inbound frame from `handle`.
    pub async fn dispatch(&self, handle: &ConnectionHandle, event: ClientEvent) {
        match event {
            ClientEvent::JoinRoom { room } => self.handle_join(handle, &room).await,
            ClientEvent::Draw { room, payload } => {
                self.relay(handle, &room, ServerEvent::UpdateDrawing(payload))
                    .await;
            }
            ClientEvent::ClearCanvas { room } => {
                self.relay(handle, &room, ServerEvent::UpdateCanvas).await;
            }
            ClientEvent::ChatMessage { room, message } => {
                self.relay(handle, &room, ServerEvent::ReceiveChatMessage { message })
                    .await;
            }
        }
    }

    /// Remove the connection's membership on transport close. Runs under
    /// the registry lock, so once this returns no broadcast can target the
    /// disconnected handle.
    pub async fn on_disconnect(&self, conn_id: ConnectionId) {
        let mut registry = self.state.registry.lock().await;
        if let Some(room_id) = registry.leave(conn_id) {
            tracing::info!("Connection '{}' removed from room '{}'", conn_id, room_id);
        }
    }

    async fn handle_join(&self, handle: &ConnectionHandle, room: &str) {
        let room_id = match RoomId::new(room) {
            Ok(room_id) => room_id,
            Err(e) => {
                tracing::warn!("Rejected join from '{}': {}", handle.id(), e);
                handle.send(ServerEvent::RoomError {
                    reason: e.to_string(),
                });
                return;
            }
        };

        let outcome = {
            let mut registry = self.state.registry.lock().await;
            registry.join_or_create(room_id, handle.clone())
        };

        handle.send(ServerEvent::RoomJoined {
            room: outcome.room.as_str().to_string(),
            created: outcome.created,
        });
    }

    /// Relay the payload of an accepted frame to the other members of the
    /// sender's current room. The frame's `room` field must name that room;
    /// anything else is a fail-soft drop.
    async fn relay(&self, handle: &ConnectionHandle, room: &str, event: ServerEvent) {
        let mut registry = self.state.registry.lock().await;

        let Some(current) = registry.room_of(handle.id()).cloned() else {
            tracing::debug!(
                "Dropping event from '{}' with no current room",
                handle.id()
            );
            return;
        };

        match RoomId::new(room) {
            Ok(room_id) if room_id == current => {}
            _ => {
                tracing::debug!(
                    "Dropping event from '{}' addressed to '{}' (current room '{}')",
                    handle.id(),
                    room,
                    current
                );
                return;
            }
        }

        let delivered = registry.relay(handle.id(), &event);
        tracing::debug!(
            "Relayed event from '{}' to {} members of room '{}'",
            handle.id(),
            delivered,
            current
        );
    }
}
