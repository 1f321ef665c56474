/// Property-based tests for chip movement using proptest
///
/// Random command sequences are applied to a live session. Chips may move
/// between balances, bets and the pot, but the total never changes and a
/// rejected command never changes anything.
use proptest::prelude::*;
use quiz_poker::{PlayerId, Session};

#[derive(Clone, Debug)]
enum Op {
    Advance,
    CollectAnte,
    Sweep,
    Bet(usize, u32),
    Fold(usize),
    Complete(usize),
    NextRound,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Advance),
        2 => Just(Op::CollectAnte),
        1 => Just(Op::Sweep),
        5 => (0usize..3, 0u32..=60).prop_map(|(seat, amount)| Op::Bet(seat, amount)),
        1 => (0usize..3).prop_map(Op::Fold),
        1 => (0usize..3).prop_map(Op::Complete),
        1 => Just(Op::NextRound),
    ]
}

fn apply(session: &mut Session, op: &Op) -> bool {
    match op {
        Op::Advance => session.advance_phase().is_ok(),
        Op::CollectAnte => session.collect_initial_bets().is_ok(),
        Op::Sweep => session.add_bets_to_pot().is_ok(),
        Op::Bet(seat, amount) => session.place_bet(&PlayerId::for_seat(*seat), *amount).is_ok(),
        Op::Fold(seat) => session.player_fold(&PlayerId::for_seat(*seat)).is_ok(),
        Op::Complete(seat) => session
            .complete_round(Some(&PlayerId::for_seat(*seat)))
            .is_ok(),
        Op::NextRound => session.start_next_round().is_ok(),
    }
}

proptest! {
    #[test]
    fn test_total_chips_are_conserved(ops in prop::collection::vec(op_strategy(), 1..120)) {
        let mut session = Session::default();
        session.start_game(&["Ann", "Bob", "Cat"].map(String::from)).unwrap();
        let total = session.state().unwrap().total_chips();

        for op in &ops {
            let before = session.state().cloned();
            let applied = apply(&mut session, op);
            let after = session.state().cloned();

            prop_assert_eq!(after.as_ref().unwrap().total_chips(), total, "after {:?}", op);
            if !applied {
                prop_assert_eq!(&before, &after, "rejected {:?} changed state", op);
            }
        }
    }

    #[test]
    fn test_bet_moves_exact_amount(amount in 10u32..=50, seat in 0usize..3) {
        let mut session = Session::default();
        session.start_game(&["Ann", "Bob", "Cat"].map(String::from)).unwrap();
        session.advance_phase().unwrap();
        session.advance_phase().unwrap();

        let player_id = PlayerId::for_seat(seat);
        session.place_bet(&player_id, amount).unwrap();

        let player = session.state().unwrap().player(&player_id).unwrap();
        prop_assert_eq!(player.balance, 750 - amount);
        prop_assert_eq!(player.current_bet, amount);
    }

    #[test]
    fn test_out_of_range_bets_are_rejected(amount in prop_oneof![0u32..10, 51u32..1000]) {
        let mut session = Session::default();
        session.start_game(&["Ann", "Bob", "Cat"].map(String::from)).unwrap();
        session.advance_phase().unwrap();
        session.advance_phase().unwrap();

        prop_assert!(session.place_bet(&PlayerId::for_seat(0), amount).is_err());
        prop_assert_eq!(session.state().unwrap().players[0].balance, 750);
    }
}
