//! Shared utilities for the drawing relay.

pub mod logger;
pub mod time;
