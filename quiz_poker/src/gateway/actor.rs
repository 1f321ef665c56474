//! Game actor: the single owner of the live session.

use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{Duration, interval},
};

use super::{
    messages::{Command, CommandReply, GameMessage, GatewayError, Outcome, Snapshot},
    timer::TimerState,
};
use crate::game::{
    AnteReport, GameConfig, GameResult, GameState, Session,
    entities::{Chips, Phase, PlayerId, RoundResult},
};

/// Gateway handle for sending commands and reading snapshots.
///
/// Cheap to clone; every adapter gets its own.
#[derive(Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<GameMessage>,
    snapshots: watch::Receiver<Arc<Snapshot>>,
}

impl GameHandle {
    /// Runs one command inside the actor and waits for its reply.
    pub async fn execute(&self, command: Command) -> Result<CommandReply, GatewayError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(GameMessage::Execute {
                command,
                response: tx,
            })
            .await
            .map_err(|_| GatewayError::Closed)?;

        rx.await.map_err(|_| GatewayError::Closed)?.map_err(GatewayError::from)
    }

    /// Latest published snapshot. Never waits on the actor.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshots.borrow().clone()
    }

    /// Latest game state, `None` before a game is started.
    #[must_use]
    pub fn get_state(&self) -> Option<GameState> {
        self.snapshot().game.clone()
    }

    /// Receiver that is notified on every published change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshots.clone()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Stops the actor. Later commands fail with [`GatewayError::Closed`].
    pub async fn shutdown(&self) -> Result<(), GatewayError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(GameMessage::Shutdown { response: tx })
            .await
            .map_err(|_| GatewayError::Closed)?;
        rx.await.map_err(|_| GatewayError::Closed)
    }

    pub async fn start_game(&self, names: &[&str]) -> Result<Arc<Snapshot>, GatewayError> {
        let names = names.iter().map(|n| (*n).to_string()).collect();
        Ok(self.execute(Command::StartGame { names }).await?.snapshot)
    }

    pub async fn update_answer(
        &self,
        player_id: &PlayerId,
        question_number: u8,
        image_data: String,
    ) -> Result<Arc<Snapshot>, GatewayError> {
        let command = Command::UpdateAnswer {
            player_id: player_id.clone(),
            question_number,
            image_data,
        };
        Ok(self.execute(command).await?.snapshot)
    }

    pub async fn approve_answer(
        &self,
        player_id: &PlayerId,
        question_number: u8,
        is_correct: bool,
    ) -> Result<Arc<Snapshot>, GatewayError> {
        let command = Command::ApproveAnswer {
            player_id: player_id.clone(),
            question_number,
            is_correct,
        };
        Ok(self.execute(command).await?.snapshot)
    }

    pub async fn collect_initial_bets(&self) -> Result<AnteReport, GatewayError> {
        match self.execute(Command::CollectInitialBets).await?.outcome {
            Outcome::Ante(report) => Ok(report),
            other => Err(GatewayError::unexpected("collect_initial_bets", &other)),
        }
    }

    pub async fn add_bets_to_pot(&self) -> Result<Chips, GatewayError> {
        match self.execute(Command::AddBetsToPot).await?.outcome {
            Outcome::Swept(amount) => Ok(amount),
            other => Err(GatewayError::unexpected("add_bets_to_pot", &other)),
        }
    }

    pub async fn place_bet(
        &self,
        player_id: &PlayerId,
        amount: Chips,
    ) -> Result<Arc<Snapshot>, GatewayError> {
        let command = Command::PlaceBet {
            player_id: player_id.clone(),
            amount,
        };
        Ok(self.execute(command).await?.snapshot)
    }

    pub async fn player_fold(&self, player_id: &PlayerId) -> Result<Arc<Snapshot>, GatewayError> {
        let command = Command::PlayerFold {
            player_id: player_id.clone(),
        };
        Ok(self.execute(command).await?.snapshot)
    }

    pub async fn advance_phase(&self) -> Result<Phase, GatewayError> {
        match self.execute(Command::AdvancePhase).await?.outcome {
            Outcome::Phase(phase) => Ok(phase),
            other => Err(GatewayError::unexpected("advance_phase", &other)),
        }
    }

    pub async fn complete_round(
        &self,
        winner_id: Option<&PlayerId>,
    ) -> Result<RoundResult, GatewayError> {
        let command = Command::CompleteRound {
            winner_id: winner_id.cloned(),
        };
        match self.execute(command).await?.outcome {
            Outcome::Round(result) => Ok(result),
            other => Err(GatewayError::unexpected("complete_round", &other)),
        }
    }

    pub async fn start_next_round(&self) -> Result<Arc<Snapshot>, GatewayError> {
        Ok(self.execute(Command::StartNextRound).await?.snapshot)
    }

    pub async fn reset_game(&self) -> Result<Arc<Snapshot>, GatewayError> {
        Ok(self.execute(Command::ResetGame).await?.snapshot)
    }

    pub async fn undo_last_action(&self) -> Result<Arc<Snapshot>, GatewayError> {
        Ok(self.execute(Command::UndoLastAction).await?.snapshot)
    }
}

/// Game actor owning the session and the display timer.
///
/// All commands are handled one at a time from the inbox, which makes the
/// actor the single critical section for every mutation.
pub struct GameActor {
    session: Session,

    timer: TimerState,

    /// Message inbox
    inbox: mpsc::Receiver<GameMessage>,

    /// Snapshot publisher
    publisher: watch::Sender<Arc<Snapshot>>,

    version: u64,

    timer_autotick: bool,

    is_closed: bool,
}

impl GameActor {
    /// Create a new game actor
    ///
    /// # Returns
    ///
    /// * `(GameActor, GameHandle)` - Actor and handle for sending messages
    #[must_use]
    pub fn new(config: GameConfig) -> (Self, GameHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let (publisher, snapshots) = watch::channel(Arc::new(Snapshot::default()));

        let actor = Self {
            timer_autotick: config.timer_autotick,
            session: Session::new(config),
            timer: TimerState::default(),
            inbox,
            publisher,
            version: 0,
            is_closed: false,
        };

        (actor, GameHandle { sender, snapshots })
    }

    /// Creates the actor and spawns it on the current runtime.
    #[must_use]
    pub fn spawn(config: GameConfig) -> GameHandle {
        let (actor, handle) = Self::new(config);
        tokio::spawn(actor.run());
        handle
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        log::info!("Game gateway starting");

        let mut tick_interval = interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => break,
                    }

                    if self.is_closed {
                        break;
                    }
                }

                _ = tick_interval.tick(), if self.timer_autotick => {
                    self.tick_timer();
                }
            }
        }

        log::info!("Game gateway closed");
    }

    fn handle_message(&mut self, message: GameMessage) {
        match message {
            GameMessage::Execute { command, response } => {
                let name = command.name();
                let result = self.handle_command(command).map(|outcome| {
                    self.publish();
                    CommandReply {
                        outcome,
                        snapshot: self.publisher.borrow().clone(),
                    }
                });

                match &result {
                    Ok(_) => log::debug!("Applied {name}"),
                    Err(e) => log::warn!("Rejected {name}: {e}"),
                }
                let _ = response.send(result);
            }

            GameMessage::Shutdown { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    fn handle_command(&mut self, command: Command) -> GameResult<Outcome> {
        let session = &mut self.session;
        let outcome = match command {
            Command::StartGame { names } => {
                session.start_game(&names)?;
                Outcome::Done
            }
            Command::UpdateAnswer {
                player_id,
                question_number,
                image_data,
            } => {
                session.update_answer(&player_id, question_number, image_data)?;
                Outcome::Done
            }
            Command::ClearPlayerAnswers { player_id } => {
                session.clear_player_answers(&player_id)?;
                Outcome::Done
            }
            Command::ApproveAnswer {
                player_id,
                question_number,
                is_correct,
            } => {
                session.approve_answer(&player_id, question_number, is_correct)?;
                Outcome::Done
            }
            Command::CollectInitialBets => Outcome::Ante(session.collect_initial_bets()?),
            Command::AddBetsToPot => Outcome::Swept(session.add_bets_to_pot()?),
            Command::PlaceBet { player_id, amount } => {
                session.place_bet(&player_id, amount)?;
                Outcome::Done
            }
            Command::PlayerFold { player_id } => {
                session.player_fold(&player_id)?;
                Outcome::Done
            }
            Command::AdvancePhase => Outcome::Phase(session.advance_phase()?),
            Command::CompleteRound { winner_id } => {
                Outcome::Round(session.complete_round(winner_id.as_ref())?)
            }
            Command::StartNextRound => {
                session.start_next_round()?;
                Outcome::Done
            }
            Command::ResetGame => {
                session.reset_game();
                Outcome::Done
            }
            Command::TogglePlayerActive {
                player_id,
                is_active,
            } => {
                session.toggle_player_active(&player_id, is_active)?;
                Outcome::Done
            }
            Command::RevealQuestion { question_number } => {
                Outcome::Revealed(session.reveal_question(question_number)?)
            }
            Command::ToggleVideoMode => Outcome::VideoMode(session.toggle_video_mode()?),
            Command::SetRoundNumber { round_number } => {
                session.set_round_number(round_number)?;
                Outcome::Done
            }
            Command::UpdatePlayerName {
                player_id,
                new_name,
            } => {
                session.update_player_name(&player_id, &new_name)?;
                Outcome::Done
            }
            Command::UndoLastAction => {
                session.undo_last_action()?;
                Outcome::Done
            }
            Command::ToggleWriting { enabled } => {
                session.toggle_writing(enabled)?;
                Outcome::Done
            }
            Command::SetTimer { seconds } => {
                self.timer.set_seconds(seconds);
                Outcome::Done
            }
            Command::StartTimer => {
                self.timer.start();
                Outcome::Done
            }
            Command::StopTimer => {
                self.timer.stop();
                Outcome::Done
            }
            Command::ResetTimer => {
                self.timer.reset();
                Outcome::Done
            }
            Command::TickTimer => {
                self.timer.tick();
                Outcome::Done
            }
        };
        Ok(outcome)
    }

    fn tick_timer(&mut self) {
        if self.timer.tick() {
            self.publish();
        }
    }

    /// Replaces the published snapshot with the current state.
    fn publish(&mut self) {
        self.version += 1;
        let snapshot = Snapshot {
            version: self.version,
            game: self.session.state().cloned(),
            timer: self.timer,
        };
        self.publisher.send_replace(Arc::new(snapshot));
    }
}
