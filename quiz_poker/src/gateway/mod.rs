//! Synchronization gateway between adapters and the game session.
//!
//! A single [`GameActor`] task owns the [`Session`](crate::game::Session)
//! and applies commands one at a time from an mpsc inbox. Each command
//! carries a oneshot reply. After every successful mutation the actor
//! publishes an immutable [`Snapshot`] through a watch channel, so readers
//! never wait behind a writer and never see a half-applied command.
//!
//! ## Example
//!
//! ```
//! use quiz_poker::game::GameConfig;
//! use quiz_poker::gateway::GameActor;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = GameActor::spawn(GameConfig::default());
//! handle.start_game(&["Ana", "Ben", "Cleo"]).await.unwrap();
//!
//! let snapshot = handle.snapshot();
//! assert_eq!(snapshot.game.as_ref().unwrap().round_number, 1);
//! # }
//! ```

pub mod actor;
pub mod messages;
pub mod timer;

pub use actor::{GameActor, GameHandle};
pub use messages::{Command, CommandReply, GameMessage, GatewayError, Outcome, Snapshot};
pub use timer::TimerState;
