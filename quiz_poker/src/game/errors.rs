//! Game error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{Chips, Phase, PlayerId};

/// Coarse classification of a rejected command.
///
/// Every kind leaves the game state untouched; the kind only tells an
/// adapter how to present the failure.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input: bad amount, player count, question or round number.
    Validation,
    /// The command is not legal in the current phase or lifecycle step.
    IllegalStateTransition,
    /// Unknown player, missing answer, no game, nothing to undo.
    NotFound,
    /// A player cannot cover the chips the command requires.
    ResourceExhausted,
}

/// One player who could not cover the ante.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AnteShortfall {
    pub player_id: PlayerId,
    pub required: Chips,
    pub available: Chips,
}

/// Errors returned by the round engine and the session manager.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("bet must be between {min} and {max}, got {amount}")]
    InvalidAmount { amount: Chips, min: Chips, max: Chips },
    #[error("need exactly 3 non-empty player names, got {0}")]
    InvalidPlayerCount(usize),
    #[error("question {0} is out of range")]
    InvalidQuestion(u8),
    #[error("round {0} is out of range")]
    InvalidRoundNumber(u32),
    #[error("player name can't be empty")]
    InvalidName,
    #[error("not allowed during {0}")]
    WrongPhase(Phase),
    #[error("{0} already folded")]
    AlreadyFolded(PlayerId),
    #[error("{0} has folded this round")]
    PlayerFolded(PlayerId),
    #[error("round {0} is still in progress")]
    RoundInProgress(u32),
    #[error("round {0} is already completed")]
    RoundAlreadyCompleted(u32),
    #[error("ante already collected this round")]
    AnteAlreadyCollected,
    #[error("game is finished")]
    GameFinished,
    #[error("writing is disabled")]
    WritingDisabled,
    #[error("can't enable writing while video mode is active")]
    VideoModeActive,
    #[error("a winner must be declared")]
    WinnerRequired,
    #[error("{0} can't win this round")]
    InvalidWinner(PlayerId),
    #[error("no active game")]
    NoActiveGame,
    #[error("no active round")]
    NoActiveRound,
    #[error("player {0} does not exist")]
    PlayerNotFound(PlayerId),
    #[error("{player_id} has no answer for question {question_number}")]
    AnswerNotFound {
        player_id: PlayerId,
        question_number: u8,
    },
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("{player_id} needs {required} but only has {available}")]
    InsufficientBalance {
        player_id: PlayerId,
        required: Chips,
        available: Chips,
    },
    #[error("{} player(s) can't cover the ante", .0.len())]
    AnteShortfall(Vec<AnteShortfall>),
}

impl GameError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount { .. }
            | Self::InvalidPlayerCount(_)
            | Self::InvalidQuestion(_)
            | Self::InvalidRoundNumber(_)
            | Self::InvalidName => ErrorKind::Validation,
            Self::WrongPhase(_)
            | Self::AlreadyFolded(_)
            | Self::PlayerFolded(_)
            | Self::RoundInProgress(_)
            | Self::RoundAlreadyCompleted(_)
            | Self::AnteAlreadyCollected
            | Self::GameFinished
            | Self::WritingDisabled
            | Self::VideoModeActive
            | Self::WinnerRequired
            | Self::InvalidWinner(_) => ErrorKind::IllegalStateTransition,
            Self::NoActiveGame
            | Self::NoActiveRound
            | Self::PlayerNotFound(_)
            | Self::AnswerNotFound { .. }
            | Self::NothingToUndo => ErrorKind::NotFound,
            Self::InsufficientBalance { .. } | Self::AnteShortfall(_) => {
                ErrorKind::ResourceExhausted
            }
        }
    }
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
