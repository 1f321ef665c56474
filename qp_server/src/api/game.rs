//! Game API handlers.
//!
//! Read endpoints serve the latest published snapshot and never wait on the
//! game actor. Every mutation goes through `POST /api/v1/commands`.
//!
//! # Examples
//!
//! Read the current game:
//! ```bash
//! curl http://localhost:3001/api/v1/gamestate
//! ```
//!
//! Place a bet:
//! ```bash
//! curl -X POST http://localhost:3001/api/v1/commands \
//!   -H "Content-Type: application/json" \
//!   -d '{"type": "place_bet", "player_id": "player_0", "amount": 20}'
//! ```

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use quiz_poker::{
    ErrorKind, GameState, GatewayError,
    entities::DisplayFeed,
    gateway::{Command, Outcome, TimerState},
};
use serde::Serialize;

use super::{AppState, request_id::RequestId};
use crate::{logging, metrics};

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub outcome: Outcome,
    /// Game state right after the command, `null` after a reset.
    pub state: Option<GameState>,
    pub version: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// `None` when the gateway itself is unavailable.
    pub kind: Option<ErrorKind>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps a gateway failure onto an HTTP status and JSON body.
pub fn error_response(err: &GatewayError) -> ApiError {
    let (status, kind) = match err {
        GatewayError::Game(e) => {
            let status = match e.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::IllegalStateTransition => StatusCode::CONFLICT,
                ErrorKind::ResourceExhausted => StatusCode::UNPROCESSABLE_ENTITY,
            };
            (status, Some(e.kind()))
        }
        GatewayError::Closed => (StatusCode::SERVICE_UNAVAILABLE, None),
        GatewayError::UnexpectedOutcome { .. } => (StatusCode::INTERNAL_SERVER_ERROR, None),
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            kind,
        }),
    )
}

/// Current game state.
///
/// # Response
///
/// Returns `200 OK` with the full game state, or `null` before a game has
/// been started.
pub async fn get_game_state(State(state): State<AppState>) -> Json<Option<GameState>> {
    Json(state.handle.get_state())
}

/// Scoreboard feed for graphics overlays.
pub async fn get_display(State(state): State<AppState>) -> Json<Option<DisplayFeed>> {
    let snapshot = state.handle.snapshot();
    Json(snapshot.game.as_ref().map(GameState::display_feed))
}

pub async fn get_timer(State(state): State<AppState>) -> Json<TimerState> {
    Json(state.handle.snapshot().timer)
}

/// Run one command against the live game.
///
/// # Request Body
///
/// A tagged command, e.g. `{"type": "advance_phase"}`.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed input (amount, question, round, names)
/// - `404 Not Found`: Unknown player or answer, no game, nothing to undo
/// - `409 Conflict`: Not legal in the current phase
/// - `422 Unprocessable Entity`: A player can't cover the chips
/// - `500 Internal Server Error`: The gateway replied with the wrong outcome
/// - `503 Service Unavailable`: The game gateway has stopped
pub async fn execute_command(
    State(state): State<AppState>,
    request_id: Option<RequestId>,
    Json(command): Json<Command>,
) -> Result<Json<CommandResponse>, ApiError> {
    let name = command.name();
    let request_id = request_id.as_ref().map(RequestId::as_str);

    let result = state.handle.execute(command).await;
    metrics::record_command(name, &result);

    match result {
        Ok(reply) => {
            logging::log_command(name, request_id, None);
            Ok(Json(CommandResponse {
                outcome: reply.outcome,
                state: reply.snapshot.game.clone(),
                version: reply.snapshot.version,
            }))
        }
        Err(e) => {
            logging::log_command(name, request_id, Some(&e.to_string()));
            Err(error_response(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_poker::{GameError, PlayerId, entities::Phase};

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (GameError::InvalidQuestion(9), StatusCode::BAD_REQUEST),
            (
                GameError::PlayerNotFound(PlayerId::new("player_9")),
                StatusCode::NOT_FOUND,
            ),
            (GameError::WrongPhase(Phase::Initial), StatusCode::CONFLICT),
            (
                GameError::InsufficientBalance {
                    player_id: PlayerId::new("player_0"),
                    required: 50,
                    available: 10,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (err, expected) in cases {
            let (status, body) = error_response(&GatewayError::Game(err.clone()));
            assert_eq!(status, expected, "{err}");
            assert_eq!(body.kind, Some(err.kind()));
        }
    }

    #[test]
    fn test_closed_gateway_is_unavailable() {
        let (status, body) = error_response(&GatewayError::Closed);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.kind, None);
    }

    #[test]
    fn test_unexpected_outcome_is_internal_error() {
        let err = GatewayError::unexpected("advance_phase", &Outcome::Done);
        let (status, body) = error_response(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.kind, None);
        assert_eq!(body.error, "unexpected done outcome for advance_phase");
    }
}
