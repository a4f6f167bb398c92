// Notification Module - Courier notification management
//
// This module handles all notification display for the cadete panel
// using a singleton pattern for AppHandle management

pub mod registry;
pub mod sender;

// Re-export public API
pub use registry::SharedRegistry;
pub use sender::{init, show_notification, show_renewal_prompt, show_test_notification};
