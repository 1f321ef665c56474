//! End-to-end round flow through the session manager.
//!
//! Drives one complete round the way the moderator console does and checks
//! balances, answers and history at every step.

use quiz_poker::{GameError, GameState, Phase, PlayerId, Session};

fn state(session: &Session) -> &GameState {
    session.state().expect("game should be running")
}

fn phase(session: &Session) -> Phase {
    state(session).current_round.as_ref().unwrap().phase
}

#[test]
fn test_moderated_round() {
    let p0 = PlayerId::new("player_0");
    let p1 = PlayerId::new("player_1");

    let mut session = Session::default();
    let names = ["Ann", "Bob", "Cat"].map(String::from);
    session.start_game(&names).unwrap();

    let balances: Vec<_> = state(&session).players.iter().map(|p| p.balance).collect();
    assert_eq!(balances, vec![750, 750, 750]);
    assert_eq!(state(&session).round_number, 1);
    assert_eq!(phase(&session), Phase::Initial);

    session.update_answer(&p0, 1, "<img>".to_string()).unwrap();
    let answers = &state(&session).players[0].answers;
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].is_correct, None);

    session.approve_answer(&p0, 1, true).unwrap();
    assert_eq!(state(&session).players[0].answers[0].is_correct, Some(true));

    session.advance_phase().unwrap();
    session.advance_phase().unwrap();
    assert_eq!(phase(&session), Phase::FirstBetting);

    session.place_bet(&p0, 20).unwrap();
    assert_eq!(state(&session).players[0].balance, 730);
    assert_eq!(state(&session).players[0].current_bet, 20);

    session.player_fold(&p1).unwrap();
    assert!(state(&session).players[1].has_folded);
    assert_eq!(
        session.place_bet(&p1, 10),
        Err(GameError::PlayerFolded(p1.clone()))
    );

    assert_eq!(
        session.complete_round(Some(&p0)),
        Err(GameError::WrongPhase(Phase::FirstBetting))
    );

    while phase(&session) != Phase::DetermineWinner {
        session.advance_phase().unwrap();
    }
    let result = session.complete_round(Some(&p0)).unwrap();

    assert_eq!(result.winner_name, "Ann");
    assert_eq!(result.pot_amount, 20);
    assert_eq!(result.correct_answers, 1);
    assert_eq!(state(&session).players[0].balance, 750);
    assert_eq!(state(&session).round_history.len(), 1);
}

#[test]
fn test_second_completion_is_rejected() {
    let p2 = PlayerId::new("player_2");
    let mut session = Session::default();
    session
        .start_game(&["Ann", "Bob", "Cat"].map(String::from))
        .unwrap();
    for _ in 0..5 {
        session.advance_phase().unwrap();
    }

    session.complete_round(Some(&p2)).unwrap();
    let after_first = state(&session).clone();

    assert_eq!(
        session.complete_round(Some(&p2)),
        Err(GameError::RoundAlreadyCompleted(1))
    );
    assert_eq!(state(&session), &after_first);
}

#[test]
fn test_display_feed_follows_grades() {
    let p1 = PlayerId::new("player_1");
    let mut session = Session::default();
    session
        .start_game(&["Ann", "Bob", "Cat"].map(String::from))
        .unwrap();
    session.update_answer(&p1, 2, "<img>".to_string()).unwrap();
    session.approve_answer(&p1, 2, false).unwrap();

    let feed = state(&session).display_feed();
    assert_eq!(feed.round_number, 1);
    assert_eq!(feed.answers[1], vec![None, Some(false), None, None]);
    assert_eq!(feed.in_play, vec![true, true, true]);
}

#[test]
fn test_leaderboard_does_not_reorder_seats() {
    let p2 = PlayerId::new("player_2");
    let mut session = Session::default();
    session
        .start_game(&["Ann", "Bob", "Cat"].map(String::from))
        .unwrap();
    session.advance_phase().unwrap();
    session.advance_phase().unwrap();
    session.place_bet(&PlayerId::new("player_0"), 30).unwrap();
    for _ in 0..3 {
        session.advance_phase().unwrap();
    }
    session.complete_round(Some(&p2)).unwrap();

    let game = state(&session);
    let ranked: Vec<_> = game.leaderboard().iter().map(|p| p.balance).collect();
    assert_eq!(ranked, vec![780, 750, 720]);
    assert_eq!(game.leaderboard()[0].id, p2);
    assert_eq!(game.players[0].id, PlayerId::new("player_0"));
}
