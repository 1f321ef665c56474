//! HTTP/WebSocket API for the game server.
//!
//! Every adapter (moderator console, player tablets, display graphics) talks
//! to the same [`GameHandle`]. Reads are served from the latest published
//! snapshot; writes are queued on the game actor.
//!
//! # Modules
//!
//! - [`game`]: Game state, display feed, timer and command endpoints
//! - [`websocket`]: Snapshot push and command channel
//! - [`request_id`]: Request correlation middleware
//!
//! # Endpoints Overview
//!
//! - `GET /health` - Server health status
//! - `GET /api/v1/gamestate` - Current game state
//! - `GET /api/v1/display` - Scoreboard feed
//! - `GET /api/v1/timer` - Display timer
//! - `POST /api/v1/commands` - Run one command
//! - `GET /ws` - Live snapshot push
//!
//! # CORS
//!
//! CORS is permissive; the server is meant for a trusted studio LAN.

pub mod game;
pub mod request_id;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use quiz_poker::GameHandle;
use serde_json::json;
use std::sync::{Arc, atomic::AtomicU64};
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    pub handle: GameHandle,
    /// Open WebSocket connections
    pub connections: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(handle: GameHandle) -> Self {
        Self {
            handle,
            connections: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET  /health             - Health check
/// GET  /api/v1/gamestate   - Game state (null before start)
/// GET  /api/v1/display     - Display feed
/// GET  /api/v1/timer       - Timer state
/// POST /api/v1/commands    - Tagged command
/// GET  /ws                 - WebSocket push
/// ```
///
/// ## Legacy Routes
/// ```text
/// GET  /api/gamestate      - Use /api/v1/gamestate
/// ```
///
/// # Example
///
/// ```rust,no_run
/// # use qp_server::api::{create_router, AppState};
/// # use quiz_poker::{GameActor, GameConfig};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = GameActor::spawn(GameConfig::default());
/// let app = create_router(AppState::new(handle));
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/gamestate", get(game::get_game_state))
        .route("/display", get(game::get_display))
        .route("/timer", get(game::get_timer))
        .route("/commands", post(game::execute_command));

    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .nest("/api/v1", v1_routes)
        .route("/api/gamestate", get(game::get_game_state))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring.
///
/// Returns `200 OK` while the game actor is running, `503 Service
/// Unavailable` once it has stopped.
///
/// ```bash
/// curl http://localhost:3001/health
/// # {"status":"healthy","game_running":true,"version":"1.0.0",...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = !state.handle.is_closed();
    let snapshot = state.handle.snapshot();

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "game_running": snapshot.game.as_ref().is_some_and(|g| !g.is_finished),
        "snapshot_version": snapshot.version,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
