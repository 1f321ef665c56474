//! Game rule configuration.

use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_ELIMINATION_ROUND, DEFAULT_MAX_BET_AMOUNT, DEFAULT_MIN_BET_AMOUNT,
    DEFAULT_MIN_BET_SCHEDULE, DEFAULT_QUESTIONS_PER_ROUND, DEFAULT_STARTING_BALANCE,
    DEFAULT_TOTAL_ROUNDS,
};
use super::entities::Chips;

/// What happens when some players can't cover the ante.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntePolicy {
    /// Collect from everyone who can pay and report the rest.
    Partial,
    /// Collect nothing unless everyone can pay.
    AllOrNothing,
}

impl std::fmt::Display for AntePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AntePolicy::Partial => write!(f, "partial"),
            AntePolicy::AllOrNothing => write!(f, "all_or_nothing"),
        }
    }
}

impl std::str::FromStr for AntePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "partial" => Ok(AntePolicy::Partial),
            "all_or_nothing" | "all-or-nothing" => Ok(AntePolicy::AllOrNothing),
            other => Err(format!("unknown ante policy '{other}'")),
        }
    }
}

/// Game rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Chips every player starts with (default: 750)
    pub starting_balance: Chips,

    /// Rounds per game (default: 7)
    pub total_rounds: u32,

    /// Questions asked each round (default: 4)
    pub questions_per_round: u8,

    /// Ante per round, last entry repeats
    pub min_bet_schedule: Vec<Chips>,

    /// Smallest single bet
    pub min_bet_amount: Chips,

    /// Largest single bet
    pub max_bet_amount: Chips,

    /// Round after which the poorest of three remaining players is dropped
    pub elimination_after_round: Option<u32>,

    pub ante_policy: AntePolicy,

    /// Whether the gateway ticks the display timer once per second
    pub timer_autotick: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            questions_per_round: DEFAULT_QUESTIONS_PER_ROUND,
            min_bet_schedule: DEFAULT_MIN_BET_SCHEDULE.to_vec(),
            min_bet_amount: DEFAULT_MIN_BET_AMOUNT,
            max_bet_amount: DEFAULT_MAX_BET_AMOUNT,
            elimination_after_round: Some(DEFAULT_ELIMINATION_ROUND),
            ante_policy: AntePolicy::Partial,
            timer_autotick: true,
        }
    }
}

impl GameConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.starting_balance == 0 {
            return Err("Starting balance must be greater than 0".to_string());
        }

        if self.total_rounds == 0 {
            return Err("Total rounds must be greater than 0".to_string());
        }

        if self.questions_per_round == 0 {
            return Err("Questions per round must be greater than 0".to_string());
        }

        if self.min_bet_schedule.is_empty() || self.min_bet_schedule.contains(&0) {
            return Err("Min bet schedule must be non-empty and positive".to_string());
        }

        if self.min_bet_amount == 0 || self.max_bet_amount < self.min_bet_amount {
            return Err("Bet limits must satisfy 0 < min <= max".to_string());
        }

        if let Some(round) = self.elimination_after_round
            && (round == 0 || round > self.total_rounds)
        {
            return Err(format!(
                "Elimination round must be between 1 and {}",
                self.total_rounds
            ));
        }

        Ok(())
    }

    /// Ante for a round (rounds are 1-indexed)
    #[must_use]
    pub fn min_bet_for_round(&self, round_number: u32) -> Chips {
        let idx = round_number.saturating_sub(1) as usize;
        self.min_bet_schedule
            .get(idx)
            .or(self.min_bet_schedule.last())
            .copied()
            .unwrap_or(self.min_bet_amount)
    }
}
