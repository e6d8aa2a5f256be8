//! Drawing relay server implementation.

mod handler;
mod registry;
mod router;
mod runner;
mod signal;
mod state;

pub use registry::{
    ConnectionHandle, ConnectionId, JoinOutcome, OutboundSender, RegistryError, Room, RoomId,
    RoomSummary, SessionRegistry,
};
pub use router::EventRouter;
pub use runner::{build_router, run_server, serve};
pub use state::AppState;
