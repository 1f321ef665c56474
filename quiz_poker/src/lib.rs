//! # Quiz Poker
//!
//! Game engine for a three-player trivia game show played like poker.
//!
//! Each round the moderator reveals questions, players write answers on
//! tablets and bet chips on how well they did. The round winner takes the
//! pot and balances carry over to the next round.
//!
//! ## Architecture
//!
//! A round moves through seven phases, strictly in order:
//!
//! - **Initial**: Players write their answers
//! - **CollectingBets**: The ante is collected
//! - **FirstBetting**: First betting street
//! - **RevealingAnswers**: Answers are shown and graded
//! - **SecondBetting**: Second betting street
//! - **DetermineWinner**: The moderator declares the winner
//! - **Completed**: The pot has been awarded
//!
//! ## Core Modules
//!
//! - [`game`]: Entities, round engine and session manager with undo
//! - [`gateway`]: Actor that serializes commands and publishes snapshots
//!
//! ## Example
//!
//! ```
//! use quiz_poker::{PlayerId, Session};
//!
//! let mut session = Session::default();
//! let names = ["Ana", "Ben", "Cleo"].map(String::from);
//! session.start_game(&names).unwrap();
//!
//! session.advance_phase().unwrap();
//! let ante = session.collect_initial_bets().unwrap();
//! assert_eq!(ante.total(), 30);
//! assert_eq!(session.state().unwrap().player(&PlayerId::new("player_0")).unwrap().balance, 740);
//! ```

/// Core game logic, entities, and session management.
pub mod game;
pub use game::{
    AntePolicy, ErrorKind, GameConfig, GameError, GameResult, GameState, Phase, PlayerId,
    Session,
    constants::{self, DEFAULT_STARTING_BALANCE, PLAYER_COUNT},
    entities,
};

/// Command gateway shared by every adapter.
pub mod gateway;
pub use gateway::{Command, GameActor, GameHandle, GatewayError, Snapshot};
