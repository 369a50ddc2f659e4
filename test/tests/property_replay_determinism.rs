/// PROPERTY-BASED TESTS: replay determinism
///
/// Identical start state and identical moves give bit-identical results,
/// whether the moves are simulated where they were made, decoded from a move
/// packet by the authority, or replayed by the client on top of a correction.
use glam::Vec2;
use proptest::prelude::*;

use wraith_client::{PredictionConfig, PredictionEngine};
use wraith_shared::{
    simulate_move, MotionState, Move, MovePacket, ShipDynamics, TriggerFlags, MAX_MOVES_IN_PACKET,
};
use wraith_test::assert_bit_identical;

fn input() -> impl Strategy<Value = (f32, f32, u8, f32, u16)> {
    (
        -1.0f32..=1.0,
        -1.0f32..=1.0,
        0u8..4,
        -10.0f32..10.0,
        1u16..100,
    )
}

fn start() -> impl Strategy<Value = MotionState> {
    (-500.0f32..500.0, -500.0f32..500.0, -50.0f32..50.0, -50.0f32..50.0, 0.0f32..7.0).prop_map(
        |(x, y, vx, vy, facing)| MotionState::new(Vec2::new(x, y), Vec2::new(vx, vy), facing),
    )
}

fn make_moves(inputs: &[(f32, f32, u8, f32, u16)]) -> Vec<Move> {
    inputs
        .iter()
        .enumerate()
        .map(|(sequence, (x, y, triggers, facing, duration))| {
            Move::new(
                sequence as u16,
                Vec2::new(*x, *y),
                TriggerFlags::from_bits(*triggers),
                *facing,
                *duration,
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_same_moves_same_state(start in start(), inputs in prop::collection::vec(input(), 1..40)) {
        let dynamics = ShipDynamics::default();
        let moves = make_moves(&inputs);

        let mut first = start;
        let mut second = start;
        for next_move in &moves {
            simulate_move(&mut first, next_move, &dynamics);
        }
        for next_move in &moves {
            simulate_move(&mut second, next_move, &dynamics);
        }
        assert_bit_identical!(first, second);
    }

    #[test]
    fn prop_moves_survive_the_wire(start in start(), inputs in prop::collection::vec(input(), 1..MAX_MOVES_IN_PACKET)) {
        let dynamics = ShipDynamics::default();
        let moves = make_moves(&inputs);
        let decoded = MovePacket::from_bytes(&MovePacket::new(moves.clone()).to_bytes()).unwrap();
        prop_assert_eq!(&decoded.moves, &moves);

        let mut local = start;
        let mut remote = start;
        for (made, received) in moves.iter().zip(decoded.moves.iter()) {
            simulate_move(&mut local, made, &dynamics);
            simulate_move(&mut remote, received, &dynamics);
        }
        assert_bit_identical!(local, remote);
    }

    #[test]
    fn prop_replay_on_exact_authority_is_seamless(
        start in start(),
        inputs in prop::collection::vec(input(), 2..40),
        confirmed_fraction in 0.0f64..1.0,
    ) {
        let dynamics = ShipDynamics::default();
        let mut engine = PredictionEngine::new(PredictionConfig::default(), dynamics.clone());
        engine.begin(start, 0);

        let mut made = Vec::new();
        for (x, y, triggers, facing, duration) in &inputs {
            let next_move = engine
                .predict(Vec2::new(*x, *y), TriggerFlags::from_bits(*triggers), *facing, *duration)
                .unwrap();
            made.push(next_move);
        }
        let predicted = engine.control_state().unwrap().actual;

        // the authority has processed a prefix of the moves
        let confirmed = ((made.len() as f64) * confirmed_fraction) as usize;
        let mut authoritative = start;
        for next_move in &made[..confirmed] {
            simulate_move(&mut authoritative, next_move, &dynamics);
        }
        let last_processed = confirmed.checked_sub(1).map(|index| made[index].sequence);

        let correction = engine.reconcile(authoritative, 0, last_processed).unwrap();
        prop_assert_eq!(correction.replayed, made.len() - confirmed);
        prop_assert_eq!(correction.distance, 0.0);
        prop_assert!(!correction.warped);
        assert_bit_identical!(engine.control_state().unwrap().actual, predicted);
    }
}
