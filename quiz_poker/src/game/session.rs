//! Game session manager.
//!
//! Owns the single live [`GameState`], drives the round lifecycle and keeps
//! one previous snapshot for undo.

use chrono::Utc;
use log::{info, warn};

use super::config::GameConfig;
use super::constants::PLAYER_COUNT;
use super::entities::{Chips, GameState, Phase, Player, PlayerId, Round, RoundResult};
use super::errors::{GameError, GameResult};
use super::round::AnteReport;
use super::rotation::dealer_for_round;

/// A game session with its rules, live state and undo slot.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    game: Option<GameState>,
    /// State before the last successful mutation. `Some(None)` means the
    /// last mutation started a game from nothing.
    previous: Option<Option<GameState>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl Session {
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            game: None,
            previous: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.previous.is_some()
    }

    /// Runs one mutation against the live game. Engine operations validate
    /// before they write, so on error the game is untouched and the undo
    /// slot keeps its old value.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut GameState, &GameConfig) -> GameResult<T>,
    ) -> GameResult<T> {
        let game = self.game.as_mut().ok_or(GameError::NoActiveGame)?;
        let before = game.clone();
        let value = op(game, &self.config)?;
        self.previous = Some(Some(before));
        Ok(value)
    }

    /// Starts a new game with three named players and opens round 1.
    pub fn start_game(&mut self, names: &[String]) -> GameResult<&GameState> {
        let valid = names.iter().filter(|n| !n.trim().is_empty()).count();
        if names.len() != PLAYER_COUNT || valid != PLAYER_COUNT {
            return Err(GameError::InvalidPlayerCount(valid));
        }

        let now = Utc::now();
        let players: [Player; PLAYER_COUNT] = std::array::from_fn(|seat| {
            Player::new(
                PlayerId::for_seat(seat),
                names[seat].trim().to_string(),
                self.config.starting_balance,
            )
        });
        let mut game = GameState {
            game_id: format!("game_{}", now.timestamp()),
            players,
            current_round: None,
            round_number: 0,
            round_history: Vec::new(),
            created_at: now.to_rfc3339(),
            is_finished: false,
            video_mode_active: false,
            writing_enabled: true,
        };
        begin_round(&mut game, 1, &self.config);

        info!("Started {} with {}", game.game_id, names.join(", "));
        self.previous = Some(self.game.replace(game));
        self.game.as_ref().ok_or(GameError::NoActiveGame)
    }

    /// Opens the next round once the current one has completed.
    pub fn start_next_round(&mut self) -> GameResult<()> {
        self.mutate(|game, config| {
            if game.is_finished {
                return Err(GameError::GameFinished);
            }
            if let Some(round) = &game.current_round
                && round.phase != Phase::Completed
            {
                return Err(GameError::RoundInProgress(round.round_number));
            }

            let next = game.round_number + 1;
            if next > config.total_rounds {
                game.current_round = None;
                game.is_finished = true;
                info!("{} finished after round {}", game.game_id, game.round_number);
                return Ok(());
            }

            begin_round(game, next, config);
            Ok(())
        })
    }

    /// Moderator override: jump to any round, restarting it from scratch.
    pub fn set_round_number(&mut self, round_number: u32) -> GameResult<()> {
        self.mutate(|game, config| {
            if !(1..=config.total_rounds).contains(&round_number) {
                return Err(GameError::InvalidRoundNumber(round_number));
            }

            game.is_finished = false;
            begin_round(game, round_number, config);
            Ok(())
        })
    }

    /// Declares the winner, awards the pot, discards the round and applies
    /// the between-round rules.
    pub fn complete_round(&mut self, winner_id: Option<&PlayerId>) -> GameResult<RoundResult> {
        self.mutate(|game, config| {
            let result = game.complete_round(winner_id)?;
            game.current_round = None;
            apply_carryover(game, config);
            Ok(result)
        })
    }

    /// Discards the game entirely. Always succeeds.
    pub fn reset_game(&mut self) {
        if let Some(game) = &self.game {
            info!("Resetting {}", game.game_id);
        }
        self.previous = Some(self.game.take());
    }

    /// Restores the state from before the last successful mutation. Only one
    /// level is kept.
    pub fn undo_last_action(&mut self) -> GameResult<Option<&GameState>> {
        let previous = self.previous.take().ok_or(GameError::NothingToUndo)?;
        self.game = previous;
        info!("Undid last action");
        Ok(self.game.as_ref())
    }

    pub fn advance_phase(&mut self) -> GameResult<Phase> {
        self.mutate(|game, _| game.advance_phase())
    }

    pub fn collect_initial_bets(&mut self) -> GameResult<AnteReport> {
        self.mutate(|game, config| game.collect_initial_bets(config.ante_policy))
    }

    pub fn add_bets_to_pot(&mut self) -> GameResult<Chips> {
        self.mutate(|game, _| game.add_bets_to_pot())
    }

    pub fn place_bet(&mut self, player_id: &PlayerId, amount: Chips) -> GameResult<()> {
        self.mutate(|game, config| game.place_bet(player_id, amount, config))
    }

    pub fn player_fold(&mut self, player_id: &PlayerId) -> GameResult<()> {
        self.mutate(|game, _| game.player_fold(player_id))
    }

    pub fn reveal_question(&mut self, question_number: u8) -> GameResult<bool> {
        self.mutate(|game, _| game.reveal_question(question_number))
    }

    pub fn update_answer(
        &mut self,
        player_id: &PlayerId,
        question_number: u8,
        image_data: String,
    ) -> GameResult<()> {
        self.mutate(|game, _| game.update_answer(player_id, question_number, image_data))
    }

    pub fn approve_answer(
        &mut self,
        player_id: &PlayerId,
        question_number: u8,
        is_correct: bool,
    ) -> GameResult<()> {
        self.mutate(|game, _| game.approve_answer(player_id, question_number, is_correct))
    }

    pub fn clear_player_answers(&mut self, player_id: &PlayerId) -> GameResult<()> {
        self.mutate(|game, _| game.clear_player_answers(player_id))
    }

    /// Marks a player in or out without touching their balance.
    pub fn toggle_player_active(&mut self, player_id: &PlayerId, is_active: bool) -> GameResult<()> {
        self.mutate(|game, _| {
            let player = game
                .players
                .iter_mut()
                .find(|p| &p.id == player_id)
                .ok_or_else(|| GameError::PlayerNotFound(player_id.clone()))?;
            player.is_active = is_active;
            info!(
                "{} is now {}",
                player.name,
                if is_active { "active" } else { "out" }
            );
            Ok(())
        })
    }

    pub fn update_player_name(&mut self, player_id: &PlayerId, new_name: &str) -> GameResult<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(GameError::InvalidName);
        }

        self.mutate(|game, _| {
            let player = game
                .players
                .iter_mut()
                .find(|p| &p.id == player_id)
                .ok_or_else(|| GameError::PlayerNotFound(player_id.clone()))?;
            player.name = new_name.to_string();
            Ok(())
        })
    }

    /// Flips video mode. Writing is blocked while video is shown and
    /// allowed again when it is hidden.
    pub fn toggle_video_mode(&mut self) -> GameResult<bool> {
        self.mutate(|game, _| {
            game.video_mode_active = !game.video_mode_active;
            game.writing_enabled = !game.video_mode_active;
            Ok(game.video_mode_active)
        })
    }

    pub fn toggle_writing(&mut self, enabled: bool) -> GameResult<()> {
        self.mutate(|game, _| {
            if enabled && game.video_mode_active {
                return Err(GameError::VideoModeActive);
            }
            game.writing_enabled = enabled;
            Ok(())
        })
    }
}

/// Opens `round_number` with fresh per-round state for every player.
///
/// Bets still in front of players go back to them. A pot that was never
/// awarded is forfeited.
fn begin_round(game: &mut GameState, round_number: u32, config: &GameConfig) {
    if let Some(round) = &game.current_round
        && round.pot > 0
    {
        warn!(
            "Round {} closed without a winner, pot of {} forfeited",
            round.round_number, round.pot
        );
    }

    for player in &mut game.players {
        player.balance += player.current_bet;
        player.reset_for_round();
    }

    let dealer = dealer_for_round(round_number, &game.players).unwrap_or(0);
    game.round_number = round_number;
    game.current_round = Some(Round::new(
        round_number,
        config.questions_per_round,
        config.min_bet_for_round(round_number),
        dealer,
    ));

    info!("Round {} started, dealer seat {}", round_number, dealer);
}

/// Between-round rules applied right after a round completes.
fn apply_carryover(game: &mut GameState, config: &GameConfig) {
    let in_play = game.players.iter().filter(|p| p.is_in_play()).count();

    if config.elimination_after_round == Some(game.round_number) && in_play > 2 {
        let poorest = game
            .players
            .iter()
            .filter(|p| p.is_in_play())
            .map(|p| p.balance)
            .min();
        if let Some(min_balance) = poorest
            && let Some(player) = game
                .players
                .iter_mut()
                .find(|p| p.is_in_play() && p.balance == min_balance)
        {
            player.is_active = false;
            info!(
                "{} eliminated after round {} with {}",
                player.name, game.round_number, player.balance
            );
        }
    }

    let in_play = game.players.iter().filter(|p| p.is_in_play()).count();
    if game.round_number >= config.total_rounds || in_play <= 1 {
        game.is_finished = true;
        info!("{} finished after round {}", game.game_id, game.round_number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["Ann".to_string(), "Bob".to_string(), "Cat".to_string()]
    }

    fn started() -> Session {
        let mut session = Session::default();
        session.start_game(&names()).unwrap();
        session
    }

    fn id(seat: usize) -> PlayerId {
        PlayerId::for_seat(seat)
    }

    fn phase(session: &Session) -> Phase {
        session.state().unwrap().current_round.as_ref().unwrap().phase
    }

    fn play_round(session: &mut Session, winner: usize) -> RoundResult {
        while phase(session) != Phase::DetermineWinner {
            session.advance_phase().unwrap();
        }
        session.complete_round(Some(&id(winner))).unwrap()
    }

    #[test]
    fn test_start_game_requires_three_names() {
        let mut session = Session::default();
        assert_eq!(
            session.start_game(&names()[..2]).unwrap_err(),
            GameError::InvalidPlayerCount(2)
        );
        let blank = vec!["Ann".to_string(), "  ".to_string(), "Cat".to_string()];
        assert_eq!(
            session.start_game(&blank).unwrap_err(),
            GameError::InvalidPlayerCount(2)
        );
        assert!(session.state().is_none());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_start_game_seats_players() {
        let session = started();
        let game = session.state().unwrap();
        assert!(game.game_id.starts_with("game_"));
        assert_eq!(game.round_number, 1);
        assert_eq!(phase(&session), Phase::Initial);
        for (seat, player) in game.players.iter().enumerate() {
            assert_eq!(player.id, id(seat));
            assert_eq!(player.balance, 750);
        }
    }

    #[test]
    fn test_commands_without_game() {
        let mut session = Session::default();
        assert_eq!(session.advance_phase(), Err(GameError::NoActiveGame));
        assert_eq!(session.start_next_round(), Err(GameError::NoActiveGame));
    }

    #[test]
    fn test_undo_restores_previous_state() {
        let mut session = started();
        session.advance_phase().unwrap();
        let before = session.state().cloned();

        session.collect_initial_bets().unwrap();
        assert_ne!(session.state().cloned(), before);

        session.undo_last_action().unwrap();
        assert_eq!(session.state().cloned(), before);
        assert_eq!(session.undo_last_action(), Err(GameError::NothingToUndo));
    }

    #[test]
    fn test_failed_command_keeps_undo_slot() {
        let mut session = started();
        session.reveal_question(1).unwrap();
        let before_reveal = session.state().cloned();
        session.reveal_question(2).unwrap();

        assert!(session.place_bet(&id(0), 10).is_err());
        session.undo_last_action().unwrap();
        assert_eq!(session.state().cloned(), before_reveal);
    }

    #[test]
    fn test_undo_start_and_reset() {
        let mut session = started();
        session.undo_last_action().unwrap();
        assert!(session.state().is_none());

        let mut session = started();
        let before = session.state().cloned();
        session.reset_game();
        assert!(session.state().is_none());
        session.undo_last_action().unwrap();
        assert_eq!(session.state().cloned(), before);
    }

    #[test]
    fn test_next_round_resets_players() {
        let mut session = started();
        session.update_answer(&id(1), 1, "ink".to_string()).unwrap();
        session.advance_phase().unwrap();
        session.collect_initial_bets().unwrap();
        session.advance_phase().unwrap();
        session.player_fold(&id(2)).unwrap();
        play_round(&mut session, 0);

        let game = session.state().unwrap();
        assert!(game.current_round.is_none());
        assert_eq!(game.players[0].balance, 770);

        session.start_next_round().unwrap();
        let game = session.state().unwrap();
        assert_eq!(game.round_number, 2);
        let round = game.current_round.as_ref().unwrap();
        assert_eq!(round.min_bet, 20);
        assert_eq!(round.dealer_index, 1);
        for player in &game.players {
            assert_eq!(player.current_bet, 0);
            assert!(!player.has_folded);
            assert!(player.answers.is_empty());
        }
    }

    #[test]
    fn test_next_round_blocked_while_in_progress() {
        let mut session = started();
        assert_eq!(session.start_next_round(), Err(GameError::RoundInProgress(1)));
    }

    #[test]
    fn test_game_finishes_after_last_round() {
        let config = GameConfig {
            elimination_after_round: None,
            ..GameConfig::default()
        };
        let mut session = Session::new(config);
        session.start_game(&names()).unwrap();

        for round in 1..=7 {
            play_round(&mut session, (round as usize) % 3);
            if round < 7 {
                session.start_next_round().unwrap();
            }
        }

        let game = session.state().unwrap();
        assert!(game.is_finished);
        assert!(game.current_round.is_none());
        assert_eq!(game.round_history.len(), 7);
        assert_eq!(session.start_next_round(), Err(GameError::GameFinished));
    }

    #[test]
    fn test_poorest_player_eliminated_after_round_four() {
        let mut session = started();
        for _ in 1..=4 {
            session.advance_phase().unwrap();
            session.collect_initial_bets().unwrap();
            if session.state().unwrap().round_number == 4 {
                session.advance_phase().unwrap();
                session.place_bet(&id(2), 50).unwrap();
            }
            play_round(&mut session, 0);
            if session.state().unwrap().round_number < 4 {
                session.start_next_round().unwrap();
            }
        }

        let game = session.state().unwrap();
        assert!(!game.players[2].is_active);
        assert!(game.players[1].is_active);
        assert!(!game.is_finished);

        session.start_next_round().unwrap();
        let game = session.state().unwrap();
        assert_eq!(game.current_round.as_ref().unwrap().dealer_index, 0);
        assert_eq!(game.total_chips(), 3 * 750);
    }

    #[test]
    fn test_set_round_number_refunds_bets() {
        let mut session = started();
        session.advance_phase().unwrap();
        session.collect_initial_bets().unwrap();

        session.set_round_number(3).unwrap();
        let game = session.state().unwrap();
        assert_eq!(game.round_number, 3);
        assert_eq!(game.current_round.as_ref().unwrap().min_bet, 40);
        assert!(game.players.iter().all(|p| p.balance == 750));
        assert_eq!(session.set_round_number(8), Err(GameError::InvalidRoundNumber(8)));
    }

    #[test]
    fn test_replayed_round_can_be_completed() {
        let mut session = started();
        play_round(&mut session, 0);

        session.set_round_number(1).unwrap();
        assert_eq!(phase(&session), Phase::Initial);
        let replay = play_round(&mut session, 1);
        assert_eq!(replay.round_number, 1);
        assert_eq!(replay.winner_id, id(1));

        let game = session.state().unwrap();
        let rounds: Vec<u32> = game.round_history.iter().map(|r| r.round_number).collect();
        assert_eq!(rounds, vec![1, 1]);
        assert_eq!(
            session.complete_round(Some(&id(1))),
            Err(GameError::RoundAlreadyCompleted(1))
        );
    }

    #[test]
    fn test_video_mode_blocks_writing() {
        let mut session = started();
        assert_eq!(session.toggle_video_mode(), Ok(true));
        assert!(!session.state().unwrap().writing_enabled);
        assert_eq!(session.toggle_writing(true), Err(GameError::VideoModeActive));
        assert_eq!(
            session.update_answer(&id(0), 1, "ink".to_string()),
            Err(GameError::WritingDisabled)
        );

        assert_eq!(session.toggle_video_mode(), Ok(false));
        assert!(session.state().unwrap().writing_enabled);
    }

    #[test]
    fn test_player_admin() {
        let mut session = started();
        session.update_player_name(&id(1), "  Bobby ").unwrap();
        assert_eq!(session.update_player_name(&id(1), " "), Err(GameError::InvalidName));
        session.toggle_player_active(&id(2), false).unwrap();

        let game = session.state().unwrap();
        assert_eq!(game.players[1].name, "Bobby");
        assert!(!game.players[2].is_active);
        assert_eq!(game.players[2].balance, 750);
    }
}
