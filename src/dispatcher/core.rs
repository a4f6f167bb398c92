// Dispatcher Thread
//
// Drains worker events from all sources and dispatches them to the
// notification, routing and cache layers. One event is handled at a
// time; the only shared state is behind the registry and cache locks.

use crate::cache::store::{CachedAsset, SharedCache, PRECACHE_URLS};
use crate::dispatcher::lifecycle::WorkerLifecycle;
use crate::notification::{self, SharedRegistry};
use crate::push::payload;
use crate::routing;
use crate::types::{current_timestamp, VersionReply, WorkerEvent, WORKER_VERSION};
use std::sync::mpsc::Receiver;
use std::thread;

/// Start dispatcher thread with the network fetcher
pub fn start_dispatcher(
    event_receiver: Receiver<WorkerEvent>,
    registry: SharedRegistry,
    cache: SharedCache,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        run_dispatcher(
            event_receiver,
            registry,
            cache,
            crate::cache::prime::fetch_asset,
        );
    })
}

pub(crate) fn run_dispatcher<F>(
    event_receiver: Receiver<WorkerEvent>,
    registry: SharedRegistry,
    cache: SharedCache,
    fetcher: F,
) where
    F: Fn(&str) -> Result<CachedAsset, String>,
{
    let mut lifecycle = WorkerLifecycle::new();
    run_install(&mut lifecycle, &cache, &fetcher);

    let mut event_count = 0u64;
    let mut last_summary = current_timestamp();

    println!("[Dispatcher] Started (worker {})", WORKER_VERSION);

    // Event loop
    loop {
        match event_receiver.recv() {
            Ok(event) => {
                event_count += 1;
                handle_event(event, &registry);
            }
            Err(_) => {
                println!("[Dispatcher] Channel disconnected, shutting down");
                break;
            }
        }

        // Periodic summary (every 30 seconds)
        let now = current_timestamp();
        if now - last_summary >= 30 {
            let displayed = registry.lock().unwrap().len();
            println!("[Dispatcher] === Status Summary ===");
            println!("[Dispatcher] Lifecycle: {}", lifecycle.state());
            println!("[Dispatcher] Total events processed: {}", event_count);
            println!("[Dispatcher] Notifications on screen: {}", displayed);
            println!("[Dispatcher] =====================");
            last_summary = now;
        }
    }
}

/// Install phase: skip waiting, prime the asset cache, claim open windows.
///
/// A failed prime fails the install (the worker goes redundant and the
/// protocol serves network-only), but notification dispatch keeps running;
/// the two concerns are independent.
pub(crate) fn run_install<F>(lifecycle: &mut WorkerLifecycle, cache: &SharedCache, fetcher: &F)
where
    F: Fn(&str) -> Result<CachedAsset, String>,
{
    lifecycle.skip_waiting();

    let primed = cache.lock().unwrap().prime_with(&PRECACHE_URLS, fetcher);

    match primed {
        Ok(count) => {
            println!("[Dispatcher] ✅ Primed {} static asset(s)", count);
            lifecycle.install_succeeded();
            routing::clients::claim_clients();
        }
        Err(e) => {
            eprintln!("[Dispatcher] ⚠️ Install failed: {}", e);
            lifecycle.install_failed();
        }
    }
}

/// Dispatch one worker event
pub(crate) fn handle_event(event: WorkerEvent, registry: &SharedRegistry) {
    match event {
        WorkerEvent::Push(raw) => handle_push(&raw, registry),
        WorkerEvent::NotificationClick { tag } => handle_click(&tag, registry),
        WorkerEvent::SubscriptionChange => notification::show_renewal_prompt(registry),
        WorkerEvent::Message { body, reply_to } => handle_message(&body, reply_to),
    }
}

fn handle_push(raw: &str, registry: &SharedRegistry) {
    println!("[Dispatcher] 📨 Push received ({} bytes)", raw.len());
    let spec = payload::resolve(&payload::parse_payload(raw));
    notification::show_notification(registry, &spec);
}

fn handle_click(tag: &str, registry: &SharedRegistry) {
    println!("[Dispatcher] 👆 Notification tapped (tag: {})", tag);

    // Close immediately; the tap consumes the notification
    let stored_url = registry
        .lock()
        .unwrap()
        .take(tag)
        .map(|note| note.url)
        .unwrap_or_default();

    let target = routing::resolve_target(&stored_url);
    let clients = routing::enumerate_clients();
    let action = routing::route_decision(&clients, target.as_str());
    routing::apply_route(action);
}

fn handle_message(body: &str, reply_to: Option<std::sync::mpsc::Sender<VersionReply>>) {
    if body != "SW_VERSION?" {
        println!("[Dispatcher] Ignoring unknown message: {}", body);
        return;
    }

    match reply_to {
        Some(sender) => {
            let reply = VersionReply {
                version: WORKER_VERSION.to_string(),
            };
            if sender.send(reply).is_err() {
                eprintln!("[Dispatcher] ⚠️ Version reply channel closed");
            } else {
                println!("[Dispatcher] 📡 Answered version query: {}", WORKER_VERSION);
            }
        }
        None => {
            // A version query without a reply channel is a no-op
            println!("[Dispatcher] Version query without reply channel, ignoring");
        }
    }
}
