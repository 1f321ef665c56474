use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, collections::BTreeSet, fmt};

use super::constants::PLAYER_COUNT;

/// Type alias for whole chips. Balances, bets and pots are all whole
/// chips and can never go negative.
pub type Chips = u32;

/// Stable player identifier. Seats are named `player_0` through
/// `player_2` in seating order.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    #[must_use]
    pub fn for_seat(seat: usize) -> Self {
        Self(format!("player_{seat}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A drawn answer to one question.
///
/// `image_data` is opaque to the engine. An empty payload is how a tablet
/// clears its canvas, but it is stored exactly like any other payload.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Answer {
    pub question_number: u8,
    pub image_data: String,
    /// `None` until the moderator grades the answer.
    pub is_correct: Option<bool>,
    pub timestamp: String,
}

impl Answer {
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.image_data.is_empty()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub balance: Chips,
    pub current_bet: Chips,
    /// Sorted by question number, at most one answer per question.
    pub answers: Vec<Answer>,
    pub is_active: bool,
    pub has_folded: bool,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: String, balance: Chips) -> Self {
        Self {
            id,
            name,
            balance,
            current_bet: 0,
            answers: Vec::new(),
            is_active: true,
            has_folded: false,
        }
    }

    #[must_use]
    pub fn is_eliminated(&self) -> bool {
        self.balance == 0
    }

    /// Takes part in dealer rotation, antes and graphics.
    #[must_use]
    pub fn is_in_play(&self) -> bool {
        self.is_active && !self.is_eliminated()
    }

    #[must_use]
    pub fn answer(&self, question_number: u8) -> Option<&Answer> {
        self.answers
            .binary_search_by_key(&question_number, |a| a.question_number)
            .ok()
            .map(|idx| &self.answers[idx])
    }

    #[must_use]
    pub fn correct_answers(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| a.is_correct == Some(true))
            .count()
    }

    /// Inserts or overwrites the answer for a question, resetting its grade.
    pub fn upsert_answer(&mut self, question_number: u8, image_data: String, timestamp: String) {
        let answer = Answer {
            question_number,
            image_data,
            is_correct: None,
            timestamp,
        };
        match self
            .answers
            .binary_search_by_key(&question_number, |a| a.question_number)
        {
            Ok(idx) => self.answers[idx] = answer,
            Err(idx) => self.answers.insert(idx, answer),
        }
    }

    /// Clears everything that only lives for one round. `is_active` is kept.
    pub fn reset_for_round(&mut self) {
        self.current_bet = 0;
        self.has_folded = false;
        self.answers.clear();
    }
}

/// Phases of a single round, in the only order they can be visited.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Phase {
    /// Players draw their answers.
    Initial,
    /// The moderator collects the ante and moves it to the pot.
    CollectingBets,
    FirstBetting,
    /// Answers are shown one by one.
    RevealingAnswers,
    SecondBetting,
    /// The moderator declares the winner.
    DetermineWinner,
    Completed,
}

impl Phase {
    /// The following phase, or `None` from `Completed`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Initial => Some(Self::CollectingBets),
            Self::CollectingBets => Some(Self::FirstBetting),
            Self::FirstBetting => Some(Self::RevealingAnswers),
            Self::RevealingAnswers => Some(Self::SecondBetting),
            Self::SecondBetting => Some(Self::DetermineWinner),
            Self::DetermineWinner => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    #[must_use]
    pub fn allows_writing(self) -> bool {
        match self {
            Self::Initial => true,
            Self::CollectingBets
            | Self::FirstBetting
            | Self::RevealingAnswers
            | Self::SecondBetting
            | Self::DetermineWinner
            | Self::Completed => false,
        }
    }

    /// Betting streets; folding is legal in exactly the same phases.
    #[must_use]
    pub fn is_betting_street(self) -> bool {
        match self {
            Self::FirstBetting | Self::SecondBetting => true,
            Self::Initial
            | Self::CollectingBets
            | Self::RevealingAnswers
            | Self::DetermineWinner
            | Self::Completed => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Initial => "initial",
            Self::CollectingBets => "collecting bets",
            Self::FirstBetting => "first betting",
            Self::RevealingAnswers => "revealing answers",
            Self::SecondBetting => "second betting",
            Self::DetermineWinner => "determine winner",
            Self::Completed => "completed",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Round {
    pub round_number: u32,
    pub questions_count: u8,
    pub pot: Chips,
    /// Ante charged per player for this round.
    pub min_bet: Chips,
    pub phase: Phase,
    /// Seat expected to act next. Advisory only, the engine does not
    /// enforce turn order.
    pub current_player_index: usize,
    pub dealer_index: usize,
    pub revealed_questions: BTreeSet<u8>,
    pub ante_collected: bool,
    /// Set once the pot has gone to a winner. A replayed round starts fresh.
    pub pot_awarded: bool,
}

impl Round {
    #[must_use]
    pub fn new(round_number: u32, questions_count: u8, min_bet: Chips, dealer_index: usize) -> Self {
        Self {
            round_number,
            questions_count,
            pot: 0,
            min_bet,
            phase: Phase::Initial,
            current_player_index: dealer_index,
            dealer_index,
            revealed_questions: BTreeSet::new(),
            ante_collected: false,
            pot_awarded: false,
        }
    }

    #[must_use]
    pub fn has_question(&self, question_number: u8) -> bool {
        (1..=self.questions_count).contains(&question_number)
    }
}

/// Immutable record of a completed round.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundResult {
    pub round_number: u32,
    pub winner_id: PlayerId,
    pub winner_name: String,
    pub pot_amount: Chips,
    pub correct_answers: usize,
    /// Every player's balance right after the pot was awarded, in seat order.
    pub balances: Vec<(PlayerId, Chips)>,
}

/// Per-seat data for scoreboards and graphics overlays.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DisplayFeed {
    pub round_number: u32,
    pub balances: Vec<Chips>,
    pub pot: Chips,
    /// Seat-major grid of grades, one column per question.
    pub answers: Vec<Vec<Option<bool>>>,
    pub in_play: Vec<bool>,
}

/// The aggregate root. Seat order in `players` is load-bearing and never
/// re-sorted.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameState {
    pub game_id: String,
    pub players: [Player; PLAYER_COUNT],
    pub current_round: Option<Round>,
    /// Mirrors the open round, or the round that just completed.
    pub round_number: u32,
    pub round_history: Vec<RoundResult>,
    pub created_at: String,
    pub is_finished: bool,
    pub video_mode_active: bool,
    pub writing_enabled: bool,
}

impl GameState {
    #[must_use]
    pub fn player_index(&self, player_id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == player_id)
    }

    #[must_use]
    pub fn player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == player_id)
    }

    /// Balances, outstanding bets and the pot. Constant across every
    /// betting operation.
    #[must_use]
    pub fn total_chips(&self) -> Chips {
        let pot = self.current_round.as_ref().map_or(0, |r| r.pot);
        self.players
            .iter()
            .map(|p| p.balance + p.current_bet)
            .sum::<Chips>()
            + pot
    }

    /// Players by balance, richest first. Storage order is left alone.
    #[must_use]
    pub fn leaderboard(&self) -> Vec<&Player> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.balance.cmp(&a.balance));
        ranked
    }

    #[must_use]
    pub fn display_feed(&self) -> DisplayFeed {
        let (pot, questions) = self
            .current_round
            .as_ref()
            .map_or((0, 0), |r| (r.pot, r.questions_count));

        DisplayFeed {
            round_number: self.round_number,
            balances: self.players.iter().map(|p| p.balance).collect(),
            pot,
            answers: self
                .players
                .iter()
                .map(|p| {
                    (1..=questions)
                        .map(|q| p.answer(q).and_then(|a| a.is_correct))
                        .collect()
                })
                .collect(),
            in_play: self.players.iter().map(Player::is_in_play).collect(),
        }
    }
}
