// Client Routing
//
// Enumerates the open windows and routes a notification tap to one of
// them. A window already on the panel just gets focus; otherwise an open
// window is focused and navigated; with no window open a new one is built.
//
// Uses the singleton pattern for AppHandle management; the window set is
// queried on demand and never cached.

use crate::routing::target;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};
use tauri::Manager;

/// Global AppHandle singleton for window routing
static APP_HANDLE: OnceCell<tauri::AppHandle> = OnceCell::new();

/// Counter for unique labels of windows opened from notification taps
static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

/// Initialize the window routing with AppHandle
/// This should be called once during app setup
pub fn init(app_handle: tauri::AppHandle) {
    if APP_HANDLE.set(app_handle).is_err() {
        eprintln!("[Routing] Warning: AppHandle already initialized");
    }
    println!("[Routing] ✅ Window routing initialized");
}

/// Snapshot of one open window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub label: String,
    pub url: String,
}

/// What to do with a notification tap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// A window already sits on the panel path: bring it forward, no navigation
    FocusOnly { label: String },
    /// Focus an open window and best-effort navigate it to the target
    FocusAndNavigate { label: String, url: String },
    /// No window is open: open exactly one at the target
    OpenWindow { url: String },
}

/// Decide where a tap should land. First matching client wins; the scan
/// order of the snapshot is preserved and later clients are not
/// considered once a match is found.
pub fn route_decision(clients: &[ClientInfo], target_url: &str) -> RouteAction {
    for client in clients {
        if target::is_panel_url(&client.url) {
            return RouteAction::FocusOnly {
                label: client.label.clone(),
            };
        }
    }

    if let Some(first) = clients.first() {
        return RouteAction::FocusAndNavigate {
            label: first.label.clone(),
            url: target_url.to_string(),
        };
    }

    RouteAction::OpenWindow {
        url: target_url.to_string(),
    }
}

/// Enumerate the open windows, in stable label order
pub fn enumerate_clients() -> Vec<ClientInfo> {
    let handle = match APP_HANDLE.get() {
        Some(handle) => handle,
        None => {
            eprintln!("[Routing] ⚠️ Cannot enumerate windows: AppHandle not initialized");
            return Vec::new();
        }
    };

    let mut windows: Vec<ClientInfo> = handle
        .windows()
        .iter()
        .map(|(label, window)| ClientInfo {
            label: label.clone(),
            url: window.url().to_string(),
        })
        .collect();
    windows.sort_by(|a, b| a.label.cmp(&b.label));
    windows
}

/// Apply a routing decision against the real window set
pub fn apply_route(action: RouteAction) {
    let handle = match APP_HANDLE.get() {
        Some(handle) => handle,
        None => {
            eprintln!("[Routing] ⚠️ Cannot route tap: AppHandle not initialized");
            return;
        }
    };

    match action {
        RouteAction::FocusOnly { label } => {
            println!("[Routing] 🎯 Focusing window '{}' already on the panel", label);
            if let Some(window) = handle.get_window(&label) {
                if let Err(e) = window.show() {
                    eprintln!("[Routing] ⚠️ Failed to show window '{}': {}", label, e);
                }
                if let Err(e) = window.set_focus() {
                    eprintln!("[Routing] ⚠️ Failed to focus window '{}': {}", label, e);
                }
            }
        }
        RouteAction::FocusAndNavigate { label, url } => {
            println!("[Routing] 🎯 Focusing window '{}' and navigating to {}", label, url);
            if let Some(window) = handle.get_window(&label) {
                if let Err(e) = window.show() {
                    eprintln!("[Routing] ⚠️ Failed to show window '{}': {}", label, e);
                }
                if let Err(e) = window.set_focus() {
                    eprintln!("[Routing] ⚠️ Failed to focus window '{}': {}", label, e);
                }
                // Navigation is best-effort; a failure leaves the window focused
                let script = format!(
                    "window.location.replace({})",
                    serde_json::to_string(&url).unwrap_or_else(|_| "'/'".to_string())
                );
                if let Err(e) = window.eval(&script) {
                    eprintln!(
                        "[Routing] ⚠️ Navigation unsupported for window '{}': {}",
                        label, e
                    );
                }
            }
        }
        RouteAction::OpenWindow { url } => {
            open_panel_window(handle, &url);
        }
    }
}

/// Open a new panel window at the target URL
fn open_panel_window(handle: &tauri::AppHandle, url: &str) {
    let parsed = match url.parse() {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("[Routing] ⚠️ Cannot open window, bad URL '{}': {}", url, e);
            return;
        }
    };

    let label = format!("panel-{}", NEXT_WINDOW_ID.fetch_add(1, Ordering::SeqCst));
    println!("[Routing] 🪟 Opening new window '{}' at {}", label, url);

    let result = tauri::WindowBuilder::new(handle, &label, tauri::WindowUrl::External(parsed))
        .title("Yo Heladerías - Panel de Cadete")
        .build();

    if let Err(e) = result {
        eprintln!("[Routing] ⚠️ Failed to open window '{}': {}", label, e);
    }
}

/// Claim the windows already open when the worker activates.
/// Returns the number of claimed windows.
pub fn claim_clients() -> usize {
    let count = match APP_HANDLE.get() {
        Some(handle) => handle.windows().len(),
        None => 0,
    };
    println!("[Routing] 📡 Claimed {} open window(s)", count);
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(label: &str, url: &str) -> ClientInfo {
        ClientInfo {
            label: label.to_string(),
            url: url.to_string(),
        }
    }

    const TARGET: &str = "https://pedidosyoheladerias.com/cadete/panel/?order=42";

    #[test]
    fn test_panel_client_gets_focus_only() {
        let clients = vec![
            client("main", "https://pedidosyoheladerias.com/cadete/panel/"),
            client("other", "https://pedidosyoheladerias.com/"),
        ];
        assert_eq!(
            route_decision(&clients, TARGET),
            RouteAction::FocusOnly {
                label: "main".to_string()
            }
        );
    }

    #[test]
    fn test_first_panel_client_wins() {
        let clients = vec![
            client("a", "https://pedidosyoheladerias.com/"),
            client("b", "https://pedidosyoheladerias.com/cadete/panel/?order=1"),
            client("c", "https://pedidosyoheladerias.com/cadete/panel/"),
        ];
        assert_eq!(
            route_decision(&clients, TARGET),
            RouteAction::FocusOnly {
                label: "b".to_string()
            }
        );
    }

    #[test]
    fn test_non_panel_client_gets_focus_and_navigate() {
        let clients = vec![client("main", "https://pedidosyoheladerias.com/")];
        assert_eq!(
            route_decision(&clients, TARGET),
            RouteAction::FocusAndNavigate {
                label: "main".to_string(),
                url: TARGET.to_string(),
            }
        );
    }

    #[test]
    fn test_no_clients_opens_exactly_one_window() {
        assert_eq!(
            route_decision(&[], TARGET),
            RouteAction::OpenWindow {
                url: TARGET.to_string()
            }
        );
    }
}
