//! Round engine: phase transitions and the commands legal in each phase.
//!
//! Every operation validates completely before touching any field, so a
//! rejected command leaves the state exactly as it was.

use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};

use super::config::{AntePolicy, GameConfig};
use super::entities::{Chips, GameState, Phase, PlayerId, RoundResult};
use super::errors::{AnteShortfall, GameError, GameResult};
use super::rotation::next_to_act;

/// Outcome of collecting the mandatory ante.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AnteReport {
    pub collected: Vec<(PlayerId, Chips)>,
    pub shortfalls: Vec<AnteShortfall>,
}

impl AnteReport {
    #[must_use]
    pub fn total(&self) -> Chips {
        self.collected.iter().map(|(_, amount)| amount).sum()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

impl GameState {
    fn seat_of(&self, player_id: &PlayerId) -> GameResult<usize> {
        self.player_index(player_id)
            .ok_or_else(|| GameError::PlayerNotFound(player_id.clone()))
    }

    /// Moves the open round to its next phase and returns it.
    pub fn advance_phase(&mut self) -> GameResult<Phase> {
        let round = self.current_round.as_mut().ok_or(GameError::NoActiveRound)?;
        let next = round.phase.next().ok_or(GameError::WrongPhase(round.phase))?;

        round.phase = next;
        if next.is_betting_street() {
            let dealer = round.dealer_index;
            let dealer_can_act =
                self.players[dealer].is_in_play() && !self.players[dealer].has_folded;
            round.current_player_index = if dealer_can_act {
                dealer
            } else {
                next_to_act(dealer, &self.players).unwrap_or(dealer)
            };
        }

        debug!("Round {} advanced to {}", round.round_number, next);
        Ok(next)
    }

    /// Charges the round's ante to every in-play, non-folded player.
    ///
    /// The chips stay in `current_bet` until [`GameState::add_bets_to_pot`].
    pub fn collect_initial_bets(&mut self, policy: AntePolicy) -> GameResult<AnteReport> {
        let round = self.current_round.as_ref().ok_or(GameError::NoActiveRound)?;
        if round.phase != Phase::CollectingBets {
            return Err(GameError::WrongPhase(round.phase));
        }
        if round.ante_collected {
            return Err(GameError::AnteAlreadyCollected);
        }

        let ante = round.min_bet;
        let mut report = AnteReport::default();
        for player in self.players.iter().filter(|p| p.is_in_play() && !p.has_folded) {
            if player.balance >= ante {
                report.collected.push((player.id.clone(), ante));
            } else {
                report.shortfalls.push(AnteShortfall {
                    player_id: player.id.clone(),
                    required: ante,
                    available: player.balance,
                });
            }
        }

        if policy == AntePolicy::AllOrNothing && !report.is_complete() {
            return Err(GameError::AnteShortfall(report.shortfalls));
        }

        for (player_id, amount) in &report.collected {
            if let Some(player) = self.players.iter_mut().find(|p| &p.id == player_id) {
                player.balance -= amount;
                player.current_bet += amount;
            }
        }
        if let Some(round) = self.current_round.as_mut() {
            round.ante_collected = true;
        }

        debug!(
            "Collected ante of {} from {} player(s), {} short",
            ante,
            report.collected.len(),
            report.shortfalls.len()
        );
        Ok(report)
    }

    /// Moves every outstanding bet into the pot and returns the amount moved.
    pub fn add_bets_to_pot(&mut self) -> GameResult<Chips> {
        let round = self.current_round.as_ref().ok_or(GameError::NoActiveRound)?;
        if round.phase == Phase::Completed {
            return Err(GameError::WrongPhase(round.phase));
        }

        Ok(self.sweep_bets())
    }

    fn sweep_bets(&mut self) -> Chips {
        let swept: Chips = self.players.iter().map(|p| p.current_bet).sum();
        for player in &mut self.players {
            player.current_bet = 0;
        }
        if let Some(round) = self.current_round.as_mut() {
            round.pot += swept;
        }
        swept
    }

    pub fn place_bet(
        &mut self,
        player_id: &PlayerId,
        amount: Chips,
        config: &GameConfig,
    ) -> GameResult<()> {
        let round = self.current_round.as_ref().ok_or(GameError::NoActiveRound)?;
        let seat = self.seat_of(player_id)?;
        if !(config.min_bet_amount..=config.max_bet_amount).contains(&amount) {
            return Err(GameError::InvalidAmount {
                amount,
                min: config.min_bet_amount,
                max: config.max_bet_amount,
            });
        }
        if !round.phase.is_betting_street() {
            return Err(GameError::WrongPhase(round.phase));
        }

        let player = &self.players[seat];
        if player.has_folded {
            return Err(GameError::PlayerFolded(player_id.clone()));
        }
        if amount > player.balance {
            return Err(GameError::InsufficientBalance {
                player_id: player_id.clone(),
                required: amount,
                available: player.balance,
            });
        }

        let player = &mut self.players[seat];
        player.balance -= amount;
        player.current_bet += amount;
        self.pass_turn(seat);

        debug!("{} bet {}", player_id, amount);
        Ok(())
    }

    pub fn player_fold(&mut self, player_id: &PlayerId) -> GameResult<()> {
        let round = self.current_round.as_ref().ok_or(GameError::NoActiveRound)?;
        let seat = self.seat_of(player_id)?;
        if !round.phase.is_betting_street() {
            return Err(GameError::WrongPhase(round.phase));
        }
        if self.players[seat].has_folded {
            return Err(GameError::AlreadyFolded(player_id.clone()));
        }

        self.players[seat].has_folded = true;
        self.pass_turn(seat);

        debug!("{} folded", player_id);
        Ok(())
    }

    fn pass_turn(&mut self, seat: usize) {
        let next = next_to_act(seat, &self.players).unwrap_or(seat);
        if let Some(round) = self.current_round.as_mut() {
            round.current_player_index = next;
        }
    }

    /// Toggles whether a question is shown to the players. Returns `true`
    /// if the question is now revealed. Legal in every phase.
    pub fn reveal_question(&mut self, question_number: u8) -> GameResult<bool> {
        let round = self.current_round.as_mut().ok_or(GameError::NoActiveRound)?;
        if !round.has_question(question_number) {
            return Err(GameError::InvalidQuestion(question_number));
        }

        let revealed = if round.revealed_questions.remove(&question_number) {
            false
        } else {
            round.revealed_questions.insert(question_number);
            true
        };
        Ok(revealed)
    }

    /// Stores a player's drawing for a question, replacing any earlier one
    /// and clearing its grade.
    pub fn update_answer(
        &mut self,
        player_id: &PlayerId,
        question_number: u8,
        image_data: String,
    ) -> GameResult<()> {
        let round = self.current_round.as_ref().ok_or(GameError::NoActiveRound)?;
        let seat = self.seat_of(player_id)?;
        if !round.has_question(question_number) {
            return Err(GameError::InvalidQuestion(question_number));
        }
        if self.video_mode_active || !self.writing_enabled {
            return Err(GameError::WritingDisabled);
        }
        if !round.phase.allows_writing() {
            return Err(GameError::WrongPhase(round.phase));
        }

        self.players[seat].upsert_answer(question_number, image_data, Utc::now().to_rfc3339());
        Ok(())
    }

    /// Grades an existing answer. Legal in every phase so the moderator can
    /// grade live while players are still writing.
    pub fn approve_answer(
        &mut self,
        player_id: &PlayerId,
        question_number: u8,
        is_correct: bool,
    ) -> GameResult<()> {
        let seat = self.seat_of(player_id)?;
        let answer = self.players[seat]
            .answers
            .iter_mut()
            .find(|a| a.question_number == question_number)
            .ok_or_else(|| GameError::AnswerNotFound {
                player_id: player_id.clone(),
                question_number,
            })?;

        answer.is_correct = Some(is_correct);
        Ok(())
    }

    pub fn clear_player_answers(&mut self, player_id: &PlayerId) -> GameResult<()> {
        let seat = self.seat_of(player_id)?;
        self.players[seat].answers.clear();
        Ok(())
    }

    /// Awards the pot to the declared winner and records the result.
    ///
    /// Outstanding bets are swept into the pot first. The round is left in
    /// `Completed`; discarding it is up to the caller.
    pub fn complete_round(&mut self, winner_id: Option<&PlayerId>) -> GameResult<RoundResult> {
        let Some(round) = self.current_round.as_ref() else {
            let already_recorded = self
                .round_history
                .last()
                .is_some_and(|r| r.round_number == self.round_number);
            return Err(if already_recorded {
                GameError::RoundAlreadyCompleted(self.round_number)
            } else {
                GameError::NoActiveRound
            });
        };
        match round.phase {
            Phase::DetermineWinner | Phase::Completed => {}
            Phase::Initial
            | Phase::CollectingBets
            | Phase::FirstBetting
            | Phase::RevealingAnswers
            | Phase::SecondBetting => return Err(GameError::WrongPhase(round.phase)),
        }
        if round.pot_awarded {
            return Err(GameError::RoundAlreadyCompleted(round.round_number));
        }

        let winner_id = winner_id.ok_or(GameError::WinnerRequired)?;
        let seat = self
            .player_index(winner_id)
            .ok_or_else(|| GameError::InvalidWinner(winner_id.clone()))?;
        let winner = &self.players[seat];
        if winner.has_folded || !winner.is_active {
            return Err(GameError::InvalidWinner(winner_id.clone()));
        }

        self.sweep_bets();
        let Some(round) = self.current_round.as_mut() else {
            return Err(GameError::NoActiveRound);
        };
        let pot = round.pot;
        let round_number = round.round_number;
        round.pot = 0;
        round.phase = Phase::Completed;
        round.pot_awarded = true;

        let winner = &mut self.players[seat];
        winner.balance += pot;

        let result = RoundResult {
            round_number,
            winner_id: winner.id.clone(),
            winner_name: winner.name.clone(),
            pot_amount: pot,
            correct_answers: winner.correct_answers(),
            balances: self
                .players
                .iter()
                .map(|p| (p.id.clone(), p.balance))
                .collect(),
        };
        self.round_history.push(result.clone());

        debug!("Round {} won by {} for {}", round_number, winner_id, pot);
        Ok(result)
    }
}
