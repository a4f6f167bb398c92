// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod cache;
mod dispatcher;
mod notification;
mod push;
mod routing;
mod types;

use notification::SharedRegistry;
use std::sync::mpsc::{channel, Sender};
use std::sync::Mutex;
use std::time::Duration;
use types::{VersionReply, WorkerEvent};

/// Managed handle that feeds webview-originated events into the worker
/// event channel
pub struct EventBridge {
    sender: Mutex<Sender<WorkerEvent>>,
}

impl EventBridge {
    fn new(sender: Sender<WorkerEvent>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }

    fn send(&self, event: WorkerEvent) -> Result<(), String> {
        self.sender
            .lock()
            .unwrap()
            .send(event)
            .map_err(|_| "worker event channel closed".to_string())
    }
}

#[tauri::command]
fn worker_version(bridge: tauri::State<EventBridge>) -> Result<VersionReply, String> {
    let (reply_tx, reply_rx) = channel();
    bridge.send(WorkerEvent::Message {
        body: "SW_VERSION?".to_string(),
        reply_to: Some(reply_tx),
    })?;

    reply_rx
        .recv_timeout(Duration::from_secs(2))
        .map_err(|_| "version query timed out".to_string())
}

#[tauri::command]
fn push_received(payload: String, bridge: tauri::State<EventBridge>) -> Result<(), String> {
    println!("[Main] Push payload forwarded from webview ({} bytes)", payload.len());
    bridge.send(WorkerEvent::Push(payload))
}

#[tauri::command]
fn notification_clicked(tag: String, bridge: tauri::State<EventBridge>) -> Result<(), String> {
    bridge.send(WorkerEvent::NotificationClick { tag })
}

#[tauri::command]
fn push_subscription_changed(bridge: tauri::State<EventBridge>) -> Result<(), String> {
    println!("[Main] Push subscription invalidated, forwarding to dispatcher");
    bridge.send(WorkerEvent::SubscriptionChange)
}

#[tauri::command]
fn show_test_notification(registry: tauri::State<SharedRegistry>) -> Result<String, String> {
    println!("[TestNotification] 🔔 Showing test notification...");
    notification::show_test_notification(&registry);
    Ok("Test notification shown!".to_string())
}

fn main() {
    // Worker event channel: pipe receiver and webview commands feed it,
    // the dispatcher thread drains it
    let (event_sender, event_receiver) = channel();

    let registry = notification::registry::shared();
    let asset_cache = cache::store::shared();

    let protocol_cache = asset_cache.clone();
    let receiver_sender = event_sender.clone();
    let dispatcher_registry = registry.clone();

    tauri::Builder::default()
        .manage(EventBridge::new(event_sender))
        .manage(registry)
        .register_uri_scheme_protocol("cadete", move |_app, request| {
            cache::protocol::handle_request(&protocol_cache, request)
        })
        .invoke_handler(tauri::generate_handler![
            worker_version,
            push_received,
            notification_clicked,
            push_subscription_changed,
            show_test_notification
        ])
        .setup(move |app| {
            let app_handle = app.handle();

            // Initialize notification system (singleton pattern)
            notification::init(app_handle.clone());

            // Initialize window routing (singleton pattern)
            routing::clients::init(app_handle.clone());

            // Start the push bridge and the dispatcher
            let _push_receiver = push::start_push_receiver(receiver_sender);
            let _dispatcher = dispatcher::start_dispatcher(
                event_receiver,
                dispatcher_registry,
                asset_cache,
            );

            println!("[Main] Cadete notifier started");
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
