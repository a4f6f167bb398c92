// Push Receiver Thread
//
// Named pipe bridge for inbound push payloads, with automatic
// reconnection, error recovery and periodic statistics.
//
// Each line on the pipe is one untrusted payload, delivered to the
// dispatcher as-is. Control lines ({"evt":"subscription_change"}) are
// recognized before regular delivery and surface the subscription
// invalidation event instead.

use crate::types::WorkerEvent;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

const PIPE_PATH: &str = "/tmp/cadete_notifier_pipe";
const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Receiver statistics
#[derive(Debug)]
struct ReceiverStats {
    payloads_received: u64,
    control_events: u64,
    read_errors: u64,
    reconnects: u64,
    last_event_time: Option<Instant>,
    start_time: Instant,
}

impl ReceiverStats {
    fn new() -> Self {
        Self {
            payloads_received: 0,
            control_events: 0,
            read_errors: 0,
            reconnects: 0,
            last_event_time: None,
            start_time: Instant::now(),
        }
    }

    fn log_summary(&self) {
        let uptime = self.start_time.elapsed().as_secs();
        let hours = uptime / 3600;
        let minutes = (uptime % 3600) / 60;

        println!("[PushReceiver] === Statistics ===");
        println!("  Uptime: {}h {}m", hours, minutes);
        println!("  Payloads received: {}", self.payloads_received);
        println!("  Control events: {}", self.control_events);
        println!("  Read errors: {}", self.read_errors);
        println!("  Reconnections: {}", self.reconnects);

        if let Some(last_time) = self.last_event_time {
            let idle_time = last_time.elapsed().as_secs();
            println!("  Last event: {}s ago", idle_time);
        }
        println!("==================");
    }
}

/// Configuration for the push receiver
pub struct ReceiverConfig {
    pub pipe_path: String,
    pub reconnect_delay: Duration,
    pub max_reconnects: u32,
    pub enable_stats: bool,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            pipe_path: PIPE_PATH.to_string(),
            reconnect_delay: RECONNECT_DELAY,
            max_reconnects: MAX_RECONNECT_ATTEMPTS,
            enable_stats: true,
        }
    }
}

/// Classify a pipe line: control event or regular push payload.
///
/// Anything that is not a recognized control line is a payload, including
/// malformed JSON (the payload layer handles the text fallback).
pub fn classify_line(line: &str) -> WorkerEvent {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(line) {
        if let Some("subscription_change") = value.get("evt").and_then(|v| v.as_str()) {
            return WorkerEvent::SubscriptionChange;
        }
    }
    WorkerEvent::Push(line.to_string())
}

/// Start push receiver thread
pub fn start_push_receiver(event_sender: Sender<WorkerEvent>) -> thread::JoinHandle<()> {
    start_push_receiver_with_config(event_sender, ReceiverConfig::default())
}

/// Start push receiver with custom configuration
pub fn start_push_receiver_with_config(
    event_sender: Sender<WorkerEvent>,
    config: ReceiverConfig,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        println!("[PushReceiver] Starting push receiver");
        let mut stats = ReceiverStats::new();
        let mut last_stats_log = Instant::now();

        loop {
            // Log statistics periodically
            if config.enable_stats && last_stats_log.elapsed() > Duration::from_secs(300) {
                stats.log_summary();
                last_stats_log = Instant::now();
            }

            match run_receiver_with_recovery(&event_sender, &config, &mut stats) {
                Ok(_) => {
                    println!("[PushReceiver] Receiver completed normally");
                    break;
                }
                Err(e) => {
                    eprintln!("[PushReceiver] Receiver error: {}", e);
                    stats.reconnects += 1;

                    // Exponential backoff
                    let delay = config.reconnect_delay * stats.reconnects.min(5) as u32;
                    thread::sleep(delay);
                }
            }
        }

        // Final statistics
        if config.enable_stats {
            stats.log_summary();
        }
    })
}

/// Run receiver with automatic recovery
fn run_receiver_with_recovery(
    event_sender: &Sender<WorkerEvent>,
    config: &ReceiverConfig,
    stats: &mut ReceiverStats,
) -> std::io::Result<()> {
    let mut consecutive_failures = 0;

    loop {
        // Ensure pipe exists and is healthy
        ensure_pipe_healthy(&config.pipe_path)?;

        match run_receiver_session(event_sender, config, stats) {
            Ok(_) => {
                return Ok(());
            }
            Err(e) => {
                consecutive_failures += 1;

                if consecutive_failures >= config.max_reconnects {
                    println!("[PushReceiver] Max failures reached, recreating pipe...");
                    recreate_pipe(&config.pipe_path)?;
                    consecutive_failures = 0;
                }

                eprintln!(
                    "[PushReceiver] Session failed (attempt {}/{}): {}",
                    consecutive_failures, config.max_reconnects, e
                );

                thread::sleep(config.reconnect_delay * consecutive_failures);
            }
        }
    }
}

/// Run a single receiver session
fn run_receiver_session(
    event_sender: &Sender<WorkerEvent>,
    config: &ReceiverConfig,
    stats: &mut ReceiverStats,
) -> std::io::Result<()> {
    println!("[PushReceiver] Opening pipe: {}", config.pipe_path);

    let file = open_pipe_robust(&config.pipe_path)?;
    let reader = BufReader::new(file);
    let mut last_activity = Instant::now();

    println!("[PushReceiver] Pipe opened successfully, listening for payloads...");

    for line_result in reader.lines() {
        // Check for read timeout
        if last_activity.elapsed() > READ_TIMEOUT {
            println!("[PushReceiver] Read timeout, reconnecting...");
            return Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "No data received within timeout period",
            ));
        }

        match line_result {
            Ok(line) => {
                last_activity = Instant::now();

                if line.trim().is_empty() {
                    continue;
                }

                let event = classify_line(line.trim());

                match &event {
                    WorkerEvent::SubscriptionChange => {
                        stats.control_events += 1;
                        println!("[PushReceiver] 🔑 Received subscription invalidation event");
                    }
                    _ => {
                        stats.payloads_received += 1;
                        println!(
                            "[PushReceiver] Payload #{} ({} bytes)",
                            stats.payloads_received,
                            line.len()
                        );
                    }
                }
                stats.last_event_time = Some(Instant::now());

                // Send to dispatcher
                if event_sender.send(event).is_err() {
                    println!("[PushReceiver] Dispatcher channel closed");
                    return Ok(());
                }
            }
            Err(e) => {
                stats.read_errors += 1;
                eprintln!("[PushReceiver] Read error #{}: {}", stats.read_errors, e);

                // Check if pipe is broken
                if is_broken_pipe_error(&e) {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::BrokenPipe,
                        "Pipe connection broken",
                    ));
                }
            }
        }
    }

    println!("[PushReceiver] Pipe closed by writer");
    Err(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "Pipe closed",
    ))
}

/// Open pipe with robust error handling
fn open_pipe_robust(path: &str) -> std::io::Result<fs::File> {
    let mut attempts = 0;
    const MAX_ATTEMPTS: u32 = 10;

    loop {
        attempts += 1;

        match OpenOptions::new().read(true).open(path) {
            Ok(file) => return Ok(file),
            Err(e) if attempts < MAX_ATTEMPTS => {
                eprintln!(
                    "[PushReceiver] Open attempt {}/{} failed: {}",
                    attempts, MAX_ATTEMPTS, e
                );
                thread::sleep(Duration::from_millis(100 * attempts as u64));
            }
            Err(e) => {
                return Err(std::io::Error::new(
                    e.kind(),
                    format!("Failed to open pipe after {} attempts: {}", MAX_ATTEMPTS, e),
                ));
            }
        }
    }
}

/// Ensure pipe exists and is healthy
fn ensure_pipe_healthy(path: &str) -> std::io::Result<()> {
    let pipe_path = Path::new(path);

    if pipe_path.exists() {
        let metadata = fs::metadata(pipe_path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if !metadata.file_type().is_fifo() {
                println!("[PushReceiver] Path exists but is not a FIFO, recreating...");
                fs::remove_file(pipe_path)?;
                create_named_pipe(path)?;
            } else {
                // Check if pipe is accessible
                match OpenOptions::new().read(true).open(pipe_path) {
                    Ok(_) => {
                        return Ok(());
                    }
                    Err(e) => {
                        eprintln!("[PushReceiver] Pipe exists but not accessible: {}", e);
                        recreate_pipe(path)?;
                    }
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = metadata;
            return Ok(());
        }
    } else {
        println!("[PushReceiver] Creating new pipe: {}", path);
        create_named_pipe(path)?;
    }

    Ok(())
}

/// Recreate the named pipe
fn recreate_pipe(path: &str) -> std::io::Result<()> {
    let pipe_path = Path::new(path);

    if pipe_path.exists() {
        println!("[PushReceiver] Removing old pipe...");
        fs::remove_file(pipe_path)?;
        thread::sleep(Duration::from_millis(100));
    }

    println!("[PushReceiver] Creating fresh pipe...");
    create_named_pipe(path)?;

    Ok(())
}

/// Check if error is a broken pipe
fn is_broken_pipe_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionAborted
    )
}

#[cfg(target_os = "macos")]
fn create_named_pipe(path: &str) -> std::io::Result<()> {
    use std::process::Command;

    let output = Command::new("mkfifo")
        .arg("-m")
        .arg("622") // rw--w--w-
        .arg(path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.contains("File exists") {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("mkfifo failed: {}", stderr),
            ));
        }
    }

    println!("[PushReceiver] Named pipe created: {}", path);
    Ok(())
}

#[cfg(target_os = "linux")]
fn create_named_pipe(path: &str) -> std::io::Result<()> {
    use nix::sys::stat;
    use nix::unistd;

    match unistd::mkfifo(
        path,
        stat::Mode::S_IRUSR | stat::Mode::S_IWUSR | stat::Mode::S_IWGRP | stat::Mode::S_IWOTH,
    ) {
        Ok(_) => {
            println!("[PushReceiver] Named pipe created: {}", path);
            Ok(())
        }
        Err(nix::errno::Errno::EEXIST) => {
            println!("[PushReceiver] Named pipe already exists: {}", path);
            Ok(())
        }
        Err(e) => Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("mkfifo failed: {}", e),
        )),
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn create_named_pipe(_path: &str) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "Named pipes not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_line_is_subscription_change() {
        let event = classify_line(r#"{"evt":"subscription_change"}"#);
        assert!(matches!(event, WorkerEvent::SubscriptionChange));
    }

    #[test]
    fn test_regular_json_is_a_payload() {
        let event = classify_line(r#"{"title":"Pedido #42","body":"Nuevo pedido"}"#);
        match event {
            WorkerEvent::Push(raw) => assert!(raw.contains("Pedido #42")),
            other => panic!("expected push event, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_control_evt_is_still_a_payload() {
        let event = classify_line(r#"{"evt":"something_else"}"#);
        assert!(matches!(event, WorkerEvent::Push(_)));
    }

    #[test]
    fn test_plain_text_is_a_payload() {
        let event = classify_line("pedido listo");
        match event {
            WorkerEvent::Push(raw) => assert_eq!(raw, "pedido listo"),
            other => panic!("expected push event, got {:?}", other),
        }
    }

    #[test]
    fn test_session_delivers_lines_in_order() {
        use std::io::Write;
        use std::sync::mpsc::channel;

        // A regular file behaves like a pipe that closes at EOF
        let mut source = tempfile::NamedTempFile::new().unwrap();
        writeln!(source, r#"{{"title":"Pedido #1"}}"#).unwrap();
        writeln!(source).unwrap();
        writeln!(source, r#"{{"evt":"subscription_change"}}"#).unwrap();
        writeln!(source, "texto suelto").unwrap();
        source.flush().unwrap();

        let config = ReceiverConfig {
            pipe_path: source.path().to_string_lossy().to_string(),
            ..ReceiverConfig::default()
        };
        let (tx, rx) = channel();
        let mut stats = ReceiverStats::new();

        let result = run_receiver_session(&tx, &config, &mut stats);
        assert!(result.is_err(), "EOF should read as a closed pipe");

        assert!(matches!(rx.try_recv().unwrap(), WorkerEvent::Push(ref raw) if raw.contains("Pedido #1")));
        assert!(matches!(rx.try_recv().unwrap(), WorkerEvent::SubscriptionChange));
        assert!(matches!(rx.try_recv().unwrap(), WorkerEvent::Push(ref raw) if raw == "texto suelto"));
        assert!(rx.try_recv().is_err());

        assert_eq!(stats.payloads_received, 2);
        assert_eq!(stats.control_events, 1);
    }
}
