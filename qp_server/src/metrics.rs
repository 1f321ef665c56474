//! Prometheus metrics for the game server.
//!
//! Metrics are exposed in Prometheus text format on a separate listener.
//! Until [`init_metrics`] is called every recording function is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use qp_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::commands_total("place_bet", true);
//! metrics::websocket_connections_active(2);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use quiz_poker::gateway::{CommandReply, GatewayError, Outcome};
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// Command Metrics
// ============================================================================

/// Count one command by name and outcome.
pub fn commands_total(command: &str, ok: bool) {
    metrics::counter!("commands_total",
        "command" => command.to_string(),
        "outcome" => if ok { "ok" } else { "rejected" }
    )
    .increment(1);
}

/// Record a finished command from any adapter, including the round
/// metrics when it completed a round.
pub fn record_command(command: &str, result: &Result<CommandReply, GatewayError>) {
    commands_total(command, result.is_ok());
    if let Ok(CommandReply {
        outcome: Outcome::Round(round),
        ..
    }) = result
    {
        rounds_completed_total();
        pot_size_chips(round.pot_amount);
    }
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Increment completed rounds counter.
pub fn rounds_completed_total() {
    metrics::counter!("rounds_completed_total").increment(1);
}

/// Record the pot awarded at the end of a round.
pub fn pot_size_chips(size: u32) {
    metrics::histogram!("pot_size_chips").record(f64::from(size));
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Set current active WebSocket connections count.
pub fn websocket_connections_active(count: u64) {
    metrics::gauge!("websocket_connections_active").set(count as f64);
}
