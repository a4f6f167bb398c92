// Routing Module - Notification tap routing
//
// This module resolves tap targets against the panel origin and routes
// taps to an open window (focus, navigate or open)

pub mod clients;
pub mod target;

// Re-export public API
pub use clients::{apply_route, enumerate_clients, route_decision};
pub use target::resolve_target;
