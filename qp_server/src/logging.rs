//! Structured logging setup.
//!
//! The game library logs through the `log` facade; those records are
//! forwarded into the same subscriber.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are taken from `RUST_LOG`, defaulting to `info`.
///
/// # Example
///
/// ```no_run
/// use qp_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log the outcome of one gateway command. Rejections are logged at `warn`.
pub fn log_command(command: &str, request_id: Option<&str>, error: Option<&str>) {
    match error {
        Some(error) => tracing::warn!(
            command = command,
            request_id = request_id,
            error = error,
            "Command rejected"
        ),
        None => tracing::debug!(command = command, request_id = request_id, "Command applied"),
    }
}

/// Log a WebSocket connect or disconnect
pub fn log_connection(event: &str, active: u64) {
    tracing::info!(event = event, active = active, "WebSocket connection");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_command() {
        // Just ensure it doesn't panic
        log_command("place_bet", Some("req-1"), None);
        log_command("place_bet", None, Some("not allowed during initial"));
    }

    #[test]
    fn test_log_connection() {
        log_connection("connected", 1);
        log_connection("disconnected", 0);
    }
}
