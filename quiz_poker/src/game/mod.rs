//! Game engine: entities, round rules and the session manager.
//!
//! This module provides:
//! - Plain data entities for players, answers, rounds and the game
//! - The round engine that enforces phase order and betting rules
//! - The [`Session`] that owns one live game with single-level undo

pub mod config;
pub mod constants;
pub mod entities;
pub mod errors;
pub mod rotation;
pub mod round;
pub mod session;

pub use config::{AntePolicy, GameConfig};
pub use entities::{
    Answer, Chips, DisplayFeed, GameState, Phase, Player, PlayerId, Round, RoundResult,
};
pub use errors::{AnteShortfall, ErrorKind, GameError, GameResult};
pub use round::AnteReport;
pub use session::Session;
