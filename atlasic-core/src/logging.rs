//! Structured logging using **tracing**.
//!
//! The core only emits events; installing a subscriber is the host's job.
//! The CLI calls [`init_structured_logging`] once at startup, which writes
//! JSON lines to stderr so stdout stays clean for graph output.

use tracing::{error, info, warn};

/// Initializes the global tracing subscriber.
///
/// Call *once* at the beginning of the process. Later calls are ignored
/// instead of panicking, so tests and embedding hosts can call it freely.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=atlasic_core=debug`)
pub fn init_structured_logging() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logs a warning event.
pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

/// Logs an info event.
pub fn log_info(message: &str) {
    info!(detail = %message);
}

/// Logs an error event.
pub fn log_error(message: &str) {
    error!(detail = %message);
}

/// Logs a custom event with a specific event name.
///
/// Maps to a log level based on the event name.
pub fn log_event(event: &str, detail: &str) {
    match event.to_uppercase().as_str() {
        "ERROR" => error!(event = %event, detail = %detail),
        "WARN" | "WARNING" => warn!(event = %event, detail = %detail),
        _ => info!(event = %event, detail = %detail),
    }
}
