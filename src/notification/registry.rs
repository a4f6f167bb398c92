// Notification Registry
//
// Tracks notifications currently on screen, keyed by tag. The desktop
// shell owns the real notification store; this registry mirrors it so
// that same-tag notifications coalesce and taps can recover the stashed
// target URL.

use crate::types::{current_timestamp, WORKER_VERSION};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One notification currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedNotification {
    pub tag: String,
    pub title: String,
    pub body: String,
    /// Target stashed for the click handler, as supplied by the payload.
    /// Normalization happens at click time, not here.
    pub url: String,
    pub version: String,
    pub shown_at: u64,
}

impl DisplayedNotification {
    pub fn new(tag: &str, title: &str, body: &str, url: &str) -> Self {
        Self {
            tag: tag.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            url: url.to_string(),
            version: WORKER_VERSION.to_string(),
            shown_at: current_timestamp(),
        }
    }
}

/// Displayed-notification set, at most one entry per tag
#[derive(Debug, Default)]
pub struct NotificationRegistry {
    displayed: HashMap<String, DisplayedNotification>,
}

impl NotificationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close any notification sharing the tag. Returns the closed entry.
    pub fn close_tag(&mut self, tag: &str) -> Option<DisplayedNotification> {
        self.displayed.remove(tag)
    }

    /// Record a freshly shown notification, replacing a same-tag entry.
    pub fn record(&mut self, note: DisplayedNotification) -> Option<DisplayedNotification> {
        self.displayed.insert(note.tag.clone(), note)
    }

    /// Take the entry for a tapped notification, closing it immediately.
    pub fn take(&mut self, tag: &str) -> Option<DisplayedNotification> {
        self.displayed.remove(tag)
    }

    pub fn get(&self, tag: &str) -> Option<&DisplayedNotification> {
        self.displayed.get(tag)
    }

    pub fn len(&self) -> usize {
        self.displayed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displayed.is_empty()
    }
}

// Type alias for the shared registry
pub type SharedRegistry = Arc<Mutex<NotificationRegistry>>;

/// Create the shared registry handed to the dispatcher and the commands
pub fn shared() -> SharedRegistry {
    Arc::new(Mutex::new(NotificationRegistry::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_tag_keeps_at_most_one_entry() {
        let mut registry = NotificationRegistry::new();
        registry.record(DisplayedNotification::new("yo-pedido", "a", "b", "/"));
        let replaced = registry.record(DisplayedNotification::new(
            "yo-pedido",
            "c",
            "d",
            "/cadete/panel/",
        ));
        assert!(replaced.is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("yo-pedido").unwrap().title, "c");
    }

    #[test]
    fn test_distinct_tags_coexist() {
        let mut registry = NotificationRegistry::new();
        registry.record(DisplayedNotification::new("pedido-1", "a", "b", "/"));
        registry.record(DisplayedNotification::new("pedido-2", "c", "d", "/"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_take_closes_the_notification() {
        let mut registry = NotificationRegistry::new();
        registry.record(DisplayedNotification::new(
            "yo-pedido",
            "a",
            "b",
            "/cadete/panel/?order=42",
        ));
        let taken = registry.take("yo-pedido").unwrap();
        assert_eq!(taken.url, "/cadete/panel/?order=42");
        assert!(registry.is_empty());
        assert!(registry.take("yo-pedido").is_none());
    }

    #[test]
    fn test_records_carry_the_version_marker() {
        let note = DisplayedNotification::new("t", "a", "b", "/");
        assert_eq!(note.version, WORKER_VERSION);
    }
}
