// Cadete Notifier Type Definitions
//
// This module contains the worker event types and shared aliases
// used throughout the application.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// Version string stamped into notification records and returned by the
/// diagnostic version query.
pub const WORKER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Unified worker event, drained by the dispatcher thread
#[derive(Debug)]
pub enum WorkerEvent {
    /// Raw, untrusted push payload (one pipe line or one bridge call)
    Push(String),
    /// The user tapped the notification identified by `tag`
    NotificationClick { tag: String },
    /// The push subscription was invalidated by the push service
    SubscriptionChange,
    /// Diagnostic message; answered only when a reply channel is supplied
    Message {
        body: String,
        reply_to: Option<Sender<VersionReply>>,
    },
}

/// Reply to the "SW_VERSION?" diagnostic message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReply {
    pub version: String,
}

/// Get current Unix timestamp in seconds
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
