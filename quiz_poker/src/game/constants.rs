//! Fixed rules of the show.

use super::entities::Chips;

/// Every game is played by exactly this many contestants.
pub const PLAYER_COUNT: usize = 3;

pub const DEFAULT_STARTING_BALANCE: Chips = 750;
pub const DEFAULT_TOTAL_ROUNDS: u32 = 7;
pub const DEFAULT_QUESTIONS_PER_ROUND: u8 = 4;

/// Smallest and largest single bet during a betting street.
pub const DEFAULT_MIN_BET_AMOUNT: Chips = 10;
pub const DEFAULT_MAX_BET_AMOUNT: Chips = 50;

/// Ante per round; the last entry repeats for every later round.
pub const DEFAULT_MIN_BET_SCHEDULE: [Chips; 4] = [10, 20, 40, 80];

/// After this round the poorest contestant leaves if more than two remain.
pub const DEFAULT_ELIMINATION_ROUND: u32 = 4;
