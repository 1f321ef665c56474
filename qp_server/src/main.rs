//! Game show server: one game actor behind an HTTP/WebSocket API.

use std::net::SocketAddr;

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use qp_server::{api, config::ServerConfig, logging, metrics};
use quiz_poker::GameActor;

const HELP: &str = "\
Run the quiz poker game server

USAGE:
  qp_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 0.0.0.0:3001]
  --metrics    IP:PORT     Prometheus exporter address [default: env METRICS_BIND, disabled if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address
  METRICS_BIND             Prometheus exporter bind address
  STARTING_BALANCE         Chips per player at game start (default 750)
  QUESTIONS_PER_ROUND      Questions asked each round (default 4)
  ANTE_POLICY              partial | all_or_nothing (default partial)
  TIMER_AUTOTICK           Tick the display timer every second (default true)
  ELIMINATION_AFTER_ROUND  Round after which the poorest player drops, or off (default 4)
  RUST_LOG                 Log filter (default info)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let metrics_bind: Option<SocketAddr> = pargs.opt_value_from_str("--metrics")?;

    logging::init();

    let config = ServerConfig::from_env(bind, metrics_bind)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Metrics exporter listening on {}", addr);
    }

    info!(
        "Game rules: {} chips, {} rounds, {} questions, ante policy {}",
        config.game.starting_balance,
        config.game.total_rounds,
        config.game.questions_per_round,
        config.game.ante_policy
    );
    let handle = GameActor::spawn(config.game.clone());

    let app = api::create_router(api::AppState::new(handle.clone()));

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    let _ = handle.shutdown().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
