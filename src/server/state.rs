//! Shared server state.

use tokio::sync::Mutex;

use super::registry::SessionRegistry;

/// Shared application state.
///
/// The single lock serializes every room mutation and broadcast, which is
/// what makes concurrent join-or-create for the same new room code safe and
/// keeps per-sender delivery order intact.
#[derive(Debug, Default)]
pub struct AppState {
    pub registry: Mutex<SessionRegistry>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
