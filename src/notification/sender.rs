// Notification Sender
//
// Shows desktop notifications for the cadete panel using singleton pattern
// - Push notifications with de-duplication by tag
// - Subscription renewal prompt
// - Test notification for debugging
//

use crate::notification::registry::{DisplayedNotification, SharedRegistry};
use crate::push::payload::{self, NotificationSpec};
use once_cell::sync::OnceCell;
use tauri::api::notification::Notification;

/// Target carrying the query marker the page layer watches for
pub const RENEW_PUSH_URL: &str = "/cadete/panel/?renew_push=1";
const RENEW_PUSH_TAG: &str = "renew-push";

/// Global AppHandle singleton for notifications
static APP_HANDLE: OnceCell<tauri::AppHandle> = OnceCell::new();

/// Initialize the notification system with AppHandle
/// This should be called once during app setup
pub fn init(app_handle: tauri::AppHandle) {
    if APP_HANDLE.set(app_handle).is_err() {
        eprintln!("[Notification] Warning: AppHandle already initialized");
    }
    println!("[Notification] ✅ Notification system initialized");
}

/// Get the bundle identifier for notifications
fn get_bundle_id() -> String {
    APP_HANDLE
        .get()
        .map(|handle| handle.config().tauri.bundle.identifier.clone())
        .unwrap_or_else(|| {
            eprintln!("[Notification] ⚠️ AppHandle not initialized, using default bundle ID");
            "com.yoheladerias.cadete".to_string()
        })
}

/// Show a resolved notification, closing any prior one with the same tag
/// first so at most one notification per tag stays visible.
///
/// The registry records the request either way; a platform show failure
/// only degrades to a log line, it is never retried.
pub fn show_notification(registry: &SharedRegistry, spec: &NotificationSpec) {
    {
        let mut reg = registry.lock().unwrap();
        if let Some(prior) = reg.close_tag(&spec.tag) {
            println!(
                "[Notification] Closed previous notification for tag '{}' ({})",
                prior.tag, prior.title
            );
        }
        reg.record(DisplayedNotification::new(
            &spec.tag, &spec.title, &spec.body, &spec.url,
        ));
    }

    println!(
        "[Notification] 📢 Showing '{}' (tag: {}, target: {})",
        spec.title, spec.tag, spec.url
    );

    if APP_HANDLE.get().is_none() {
        eprintln!("[Notification] ⚠️ Cannot show notification: AppHandle not initialized");
        return;
    }

    let result = Notification::new(get_bundle_id())
        .title(&spec.title)
        .body(&spec.body)
        .icon(spec.icon.clone())
        .show();

    match result {
        Ok(_) => {
            println!("[Notification] ✅ Notification shown successfully");
        }
        Err(e) => {
            // No retry; the user-visible effect is a silently skipped notification
            eprintln!("[Notification] ⚠️ Failed to show notification: {}", e);
        }
    }
}

/// Show the fixed low-urgency prompt inviting the courier to re-authorize
/// notifications after the push subscription was invalidated.
///
/// The agent has no credentials to re-subscribe by itself; the panel page
/// detects the renew_push marker in the URL and reacts to it.
pub fn show_renewal_prompt(registry: &SharedRegistry) {
    println!("[Notification] 🔑 Push subscription invalidated, showing renewal prompt");

    let spec = NotificationSpec {
        title: payload::DEFAULT_TITLE.to_string(),
        body: "Tocá para reactivar las notificaciones de pedidos.".to_string(),
        url: RENEW_PUSH_URL.to_string(),
        icon: payload::DEFAULT_ICON.to_string(),
        badge: payload::DEFAULT_ICON.to_string(),
        tag: RENEW_PUSH_TAG.to_string(),
        vibrate: Vec::new(),
        require_interaction: false,
        renotify: true,
        actions: Vec::new(),
    };

    show_notification(registry, &spec);
}

/// Send test notification for debugging
pub fn show_test_notification(registry: &SharedRegistry) {
    println!("[Notification] 🔔 Showing test notification");
    let spec = payload::resolve(&payload::PushPayload::default());
    show_notification(registry, &spec);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::registry;

    #[test]
    fn test_show_without_app_handle_still_records() {
        // Without an AppHandle the platform call is skipped but the
        // registry keeps the record for dedup and click routing
        let reg = registry::shared();
        let spec = payload::resolve(&payload::parse_payload(r#"{"tag":"pedido-9"}"#));
        show_notification(&reg, &spec);
        assert_eq!(reg.lock().unwrap().len(), 1);
        assert!(reg.lock().unwrap().get("pedido-9").is_some());
    }

    #[test]
    fn test_same_tag_dedup_through_sender() {
        let reg = registry::shared();
        let first = payload::resolve(&payload::parse_payload(
            r#"{"tag":"yo-pedido","title":"Pedido #1"}"#,
        ));
        let second = payload::resolve(&payload::parse_payload(
            r#"{"tag":"yo-pedido","title":"Pedido #2"}"#,
        ));
        show_notification(&reg, &first);
        show_notification(&reg, &second);

        let locked = reg.lock().unwrap();
        assert_eq!(locked.len(), 1);
        assert_eq!(locked.get("yo-pedido").unwrap().title, "Pedido #2");
    }

    #[test]
    fn test_renewal_prompt_carries_the_query_marker() {
        let reg = registry::shared();
        show_renewal_prompt(&reg);
        let locked = reg.lock().unwrap();
        let note = locked.get("renew-push").unwrap();
        assert!(note.url.contains("renew_push=1"));
    }
}
