//! Collaborative drawing relay library.
//!
//! This library implements the server side of a shared-canvas application:
//! participants connect over WebSocket, join a room by short code, and the
//! relay fans out their stroke-segment, canvas-clear, and chat events to
//! every other member of the same room.

pub mod common;
pub mod protocol;
pub mod server;
