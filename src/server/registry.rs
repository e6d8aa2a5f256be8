//! Session registry: rooms, membership, and broadcast relay.
//!
//! The registry is the sole authority over which connection belongs to which
//! room. Rooms are pure relays: they hold member handles and fan events out,
//! but store no pixel content and no chat history. Membership is mutated
//! only through registry operations so the single-room-per-connection
//! invariant is enforced in one place.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::common::time::get_jst_timestamp;
use crate::protocol::ServerEvent;

/// Outbound delivery channel for one connection. Unbounded so a slow
/// receiver never stalls the relay for the rest of the room.
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;

/// Maximum accepted room code length (wire contract).
const MAX_ROOM_ID_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid room id: {0}")]
    InvalidRoom(String),
}

/// Opaque room code, case-insensitive on the wire.
///
/// Normalized to ASCII uppercase on construction so `"abcd"` and `"ABCD"`
/// address the same room. Unique among active rooms only; once a room is
/// destroyed its id is free for reuse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: &str) -> Result<Self, RegistryError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::InvalidRoom(
                "room code must not be empty".to_string(),
            ));
        }
        if trimmed.len() > MAX_ROOM_ID_LEN {
            return Err(RegistryError::InvalidRoom(format!(
                "room code must be at most {MAX_ROOM_ID_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one live connection, assigned at transport accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One participant's live connection: its identity plus the outbound
/// delivery channel owned by the socket's send task.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: OutboundSender,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: OutboundSender) -> Self {
        Self { id, sender }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Enqueue an event for delivery to this participant only.
    ///
    /// Never blocks. Returns `false` when the peer's send task is gone;
    /// the caller treats that as a disconnect, not as a relay failure.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// One broadcast domain: the set of member handles for a room code.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    members: HashMap<ConnectionId, ConnectionHandle>,
    /// Unix timestamp in JST milliseconds, surfaced by the rooms API.
    created_at: i64,
}

impl Room {
    fn new(id: RoomId, created_at: i64) -> Self {
        Self {
            id,
            members: HashMap::new(),
            created_at,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a member handle. Idempotent: re-adding an existing connection
    /// leaves the member set unchanged.
    fn add_member(&mut self, handle: ConnectionHandle) {
        self.members.entry(handle.id()).or_insert(handle);
    }

    fn remove_member(&mut self, conn_id: ConnectionId) -> bool {
        self.members.remove(&conn_id).is_some()
    }

    /// Deliver `event` to every member except `exclude`.
    ///
    /// Returns the number of successful deliveries plus the ids of members
    /// whose channel was already closed. A dead peer never aborts the rest
    /// of the fan-out; the registry prunes the returned ids afterwards.
    fn broadcast(&self, event: &ServerEvent, exclude: ConnectionId) -> (usize, Vec<ConnectionId>) {
        let mut delivered = 0;
        let mut unreachable = Vec::new();
        for (conn_id, handle) in &self.members {
            if *conn_id == exclude {
                continue;
            }
            if handle.send(event.clone()) {
                delivered += 1;
            } else {
                tracing::warn!("Member '{}' of room '{}' unreachable, pruning", conn_id, self.id);
                unreachable.push(*conn_id);
            }
        }
        (delivered, unreachable)
    }
}

/// Outcome of a join-or-create operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room: RoomId,
    /// `true` when this join brought the room into existence.
    pub created: bool,
}

/// Read-only snapshot of one active room for the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: String,
    pub members: usize,
    pub created_at: i64,
}

/// The sole authority mapping room codes to rooms.
///
/// Also keeps the reverse index connection -> room so that a connection is
/// never a member of two rooms at once. All mutation goes through a single
/// `Mutex` held by [`super::state::AppState`], which serializes joins,
/// leaves, and broadcasts for every room.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    rooms: HashMap<RoomId, Room>,
    memberships: HashMap<ConnectionId, RoomId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handle` to the room named `room_id`, creating the room on
    /// first join. If the connection is currently a member of a different
    /// room it leaves that room first, so joining is never an error for a
    /// valid room code.
    pub fn join_or_create(&mut self, room_id: RoomId, handle: ConnectionHandle) -> JoinOutcome {
        let conn_id = handle.id();

        if let Some(current) = self.memberships.get(&conn_id) {
            if *current == room_id {
                // Re-join of the current room is a no-op.
                return JoinOutcome {
                    room: room_id,
                    created: false,
                };
            }
            let previous = current.clone();
            self.leave(conn_id);
            tracing::info!(
                "Connection '{}' left room '{}' to join '{}'",
                conn_id,
                previous,
                room_id
            );
        }

        let created = !self.rooms.contains_key(&room_id);
        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone(), get_jst_timestamp()));
        room.add_member(handle);
        self.memberships.insert(conn_id, room_id.clone());

        if created {
            tracing::info!("Room '{}' created by connection '{}'", room_id, conn_id);
        } else {
            tracing::info!(
                "Connection '{}' joined room '{}' ({} members)",
                conn_id,
                room_id,
                room.member_count()
            );
        }

        JoinOutcome {
            room: room_id,
            created,
        }
    }

    /// Remove the connection's membership, destroying the room when the
    /// last member leaves. Idempotent: a connection with no membership is
    /// a no-op and returns `None`.
    pub fn leave(&mut self, conn_id: ConnectionId) -> Option<RoomId> {
        let room_id = self.memberships.remove(&conn_id)?;
        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.remove_member(conn_id);
            if room.is_empty() {
                self.rooms.remove(&room_id);
                tracing::info!("Room '{}' destroyed (last member left)", room_id);
            }
        }
        Some(room_id)
    }

    /// The room this connection currently belongs to, if any.
    pub fn room_of(&self, conn_id: ConnectionId) -> Option<&RoomId> {
        self.memberships.get(&conn_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn member_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, Room::member_count)
    }

    /// Relay `event` to every member of the sender's current room except
    /// the sender itself. Members whose transport is gone at delivery time
    /// are removed before this call returns, so no later broadcast targets
    /// a dead handle. Returns the number of members reached.
    pub fn relay(&mut self, sender_id: ConnectionId, event: &ServerEvent) -> usize {
        let Some(room_id) = self.memberships.get(&sender_id).cloned() else {
            return 0;
        };
        let Some(room) = self.rooms.get(&room_id) else {
            return 0;
        };

        let (delivered, unreachable) = room.broadcast(event, sender_id);
        for conn_id in unreachable {
            self.leave(conn_id);
        }
        delivered
    }

    /// Snapshot of all active rooms for the HTTP API.
    pub fn room_summaries(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self
            .rooms
            .values()
            .map(|room| RoomSummary {
                id: room.id().as_str().to_string(),
                members: room.member_count(),
                created_at: room.created_at,
            })
            .collect();

        // Sort by id for consistent ordering
        summaries.sort_by(|a, b| a.id.cmp(&b.id));

        summaries
    }
}
