//! Gateway message types.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;

use super::timer::TimerState;
use crate::game::{
    AnteReport, GameError, GameState,
    entities::{Chips, Phase, PlayerId, RoundResult},
};

/// Every command an adapter can send. Serialized with a `type` tag so HTTP
/// and WebSocket adapters can forward JSON bodies unchanged.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    StartGame {
        names: Vec<String>,
    },
    UpdateAnswer {
        player_id: PlayerId,
        question_number: u8,
        image_data: String,
    },
    ClearPlayerAnswers {
        player_id: PlayerId,
    },
    ApproveAnswer {
        player_id: PlayerId,
        question_number: u8,
        is_correct: bool,
    },
    CollectInitialBets,
    AddBetsToPot,
    PlaceBet {
        player_id: PlayerId,
        amount: Chips,
    },
    PlayerFold {
        player_id: PlayerId,
    },
    AdvancePhase,
    CompleteRound {
        #[serde(default)]
        winner_id: Option<PlayerId>,
    },
    StartNextRound,
    ResetGame,
    TogglePlayerActive {
        player_id: PlayerId,
        is_active: bool,
    },
    RevealQuestion {
        question_number: u8,
    },
    ToggleVideoMode,
    SetRoundNumber {
        round_number: u32,
    },
    UpdatePlayerName {
        player_id: PlayerId,
        new_name: String,
    },
    UndoLastAction,
    ToggleWriting {
        enabled: bool,
    },
    SetTimer {
        seconds: u32,
    },
    StartTimer,
    StopTimer,
    ResetTimer,
    TickTimer,
}

impl Command {
    /// Stable name for logs and metrics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartGame { .. } => "start_game",
            Self::UpdateAnswer { .. } => "update_answer",
            Self::ClearPlayerAnswers { .. } => "clear_player_answers",
            Self::ApproveAnswer { .. } => "approve_answer",
            Self::CollectInitialBets => "collect_initial_bets",
            Self::AddBetsToPot => "add_bets_to_pot",
            Self::PlaceBet { .. } => "place_bet",
            Self::PlayerFold { .. } => "player_fold",
            Self::AdvancePhase => "advance_phase",
            Self::CompleteRound { .. } => "complete_round",
            Self::StartNextRound => "start_next_round",
            Self::ResetGame => "reset_game",
            Self::TogglePlayerActive { .. } => "toggle_player_active",
            Self::RevealQuestion { .. } => "reveal_question",
            Self::ToggleVideoMode => "toggle_video_mode",
            Self::SetRoundNumber { .. } => "set_round_number",
            Self::UpdatePlayerName { .. } => "update_player_name",
            Self::UndoLastAction => "undo_last_action",
            Self::ToggleWriting { .. } => "toggle_writing",
            Self::SetTimer { .. } => "set_timer",
            Self::StartTimer => "start_timer",
            Self::StopTimer => "stop_timer",
            Self::ResetTimer => "reset_timer",
            Self::TickTimer => "tick_timer",
        }
    }
}

/// Command-specific result carried next to the new snapshot.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Phase(Phase),
    Ante(AnteReport),
    /// Chips moved into the pot.
    Swept(Chips),
    /// Whether the toggled question is now revealed.
    Revealed(bool),
    Round(RoundResult),
    VideoMode(bool),
}

impl Outcome {
    /// Same name as the serialized `type` tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Phase(_) => "phase",
            Self::Ante(_) => "ante",
            Self::Swept(_) => "swept",
            Self::Revealed(_) => "revealed",
            Self::Round(_) => "round",
            Self::VideoMode(_) => "video_mode",
        }
    }
}

/// Complete, immutable view of everything the gateway publishes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Bumped on every published change.
    pub version: u64,
    pub game: Option<GameState>,
    pub timer: TimerState,
}

#[derive(Clone, Debug)]
pub struct CommandReply {
    pub outcome: Outcome,
    pub snapshot: Arc<Snapshot>,
}

/// Messages that can be sent to a GameActor
#[derive(Debug)]
pub enum GameMessage {
    Execute {
        command: Command,
        response: oneshot::Sender<Result<CommandReply, GameError>>,
    },

    Shutdown {
        response: oneshot::Sender<()>,
    },
}

/// Errors seen by gateway callers
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The command was rejected; state is unchanged.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The actor has stopped.
    #[error("game gateway is closed")]
    Closed,

    /// The actor answered a command with an outcome of the wrong shape.
    #[error("unexpected {outcome} outcome for {command}")]
    UnexpectedOutcome {
        command: &'static str,
        outcome: &'static str,
    },
}

impl GatewayError {
    #[must_use]
    pub fn unexpected(command: &'static str, outcome: &Outcome) -> Self {
        Self::UnexpectedOutcome {
            command,
            outcome: outcome.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_outcome_names_command_and_outcome() {
        let err = GatewayError::unexpected("advance_phase", &Outcome::Swept(30));

        assert_eq!(
            err,
            GatewayError::UnexpectedOutcome {
                command: "advance_phase",
                outcome: "swept",
            }
        );
        assert_eq!(err.to_string(), "unexpected swept outcome for advance_phase");
        assert_ne!(err, GatewayError::Closed);
    }

    #[test]
    fn test_outcome_names_match_serde_tags() {
        let outcomes = [
            Outcome::Done,
            Outcome::Phase(Phase::Initial),
            Outcome::Swept(0),
            Outcome::Revealed(true),
            Outcome::VideoMode(false),
        ];
        for outcome in outcomes {
            let json = serde_json::to_value(&outcome).unwrap();
            assert_eq!(json["type"], outcome.name());
        }
    }
}
