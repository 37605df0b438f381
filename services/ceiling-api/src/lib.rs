//! Ceiling API service library.
//!
//! Exposes the internal modules so the integration tests can build the
//! router directly.

pub mod controller;
pub mod handlers;
pub mod render;
pub mod state;
