/// SCENARIO: prediction, reconciliation and interpolation end to end
///
/// The controlled ship moves on the client the moment input is made. When
/// the authority disagrees a little, the difference is blended away and the
/// trail survives; when the authority teleports the ship, the client snaps.
use glam::Vec2;

use wraith_client::{CorrectedEvent, PredictionPhase};
use wraith_server::ServerConfig;
use wraith_shared::{NetId, ShipGroup, ShipState, Team, TriggerFlags};
use wraith_test::{assert_bit_identical, Harness, LossyLink};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// A harness with one viewer controlling a ship at `position`, already synced
fn controlled_ship(position: Vec2, downlink: LossyLink) -> (Harness, usize, NetId) {
    init_logger();
    let mut harness = Harness::new(ServerConfig::default());
    let viewer = harness.add_viewer(downlink);
    let ship = harness
        .server
        .spawn_entity(ShipState::new(Team::Blue, position));
    let key = harness.viewer(viewer).key;
    harness.server.set_control(&key, Some(ship)).unwrap();
    assert!(harness.step_until(10, |harness| harness.viewer(viewer).client.control().is_some()));
    harness.viewer_mut(viewer).client.take_events();
    (harness, viewer, ship)
}

#[test]
fn prediction_matches_authority_without_corrections() {
    let (mut harness, viewer, ship) = controlled_ship(Vec2::ZERO, LossyLink::reliable());
    harness.viewer_mut(viewer).input.thrust = Vec2::new(1.0, 0.5);
    harness.viewer_mut(viewer).input.triggers = TriggerFlags::BOOST;
    harness.step_n(30);

    let client = &harness.viewer(viewer).client;
    let predicted = client.prediction().control_state().unwrap().actual;
    let authoritative = harness.server.entity(&ship).unwrap().motion().unwrap();
    assert_bit_identical!(predicted, authoritative);
    assert!(predicted.position.x > 10.0);

    let corrections: Vec<_> = harness
        .viewer_mut(viewer)
        .client
        .events()
        .read::<CorrectedEvent>()
        .collect();
    assert!(corrections.is_empty(), "{corrections:?}");
}

#[test]
fn delayed_updates_replay_pending_moves() {
    let (mut harness, viewer, ship) =
        controlled_ship(Vec2::ZERO, LossyLink::reliable().with_delay(3));
    harness.viewer_mut(viewer).input.thrust = Vec2::Y;
    harness.step_n(20);

    let client = &harness.viewer(viewer).client;
    assert_eq!(
        client.prediction().phase(),
        PredictionPhase::AwaitingReconciliation
    );
    assert!(client.prediction().pending_moves().count() >= 3);

    // once the link drains, the replayed prediction lands on the authority
    harness.viewer_mut(viewer).input.thrust = Vec2::ZERO;
    let server_before = harness.server.entity(&ship).unwrap().position();
    harness.step_n(10);
    let predicted = harness
        .viewer(viewer)
        .client
        .prediction()
        .control_state()
        .unwrap()
        .actual;
    assert!(predicted.position.y >= server_before.y);
    let corrections: Vec<_> = harness
        .viewer_mut(viewer)
        .client
        .events()
        .read::<CorrectedEvent>()
        .collect();
    assert!(corrections.is_empty(), "{corrections:?}");
}

#[test]
fn small_correction_blends_and_keeps_trail() {
    let (mut harness, viewer, ship) = controlled_ship(Vec2::new(10.0, 10.0), LossyLink::reliable());
    harness.step_n(3);
    let trail_before = harness.viewer(viewer).client.prediction().trail().len();
    assert!(trail_before > 1);

    // the authority decides the ship is one unit lower, without a teleport
    harness
        .server
        .entity_mut(&ship)
        .unwrap()
        .as_ship_mut()
        .unwrap()
        .motion
        .position = Vec2::new(10.0, 9.0);
    harness.server.set_dirty(&ship, ShipGroup::Motion).unwrap();
    harness.step();

    let corrections: Vec<_> = harness
        .viewer_mut(viewer)
        .client
        .events()
        .read::<CorrectedEvent>()
        .collect();
    assert_eq!(corrections.len(), 1);
    let (_, distance, warped) = corrections[0];
    assert_eq!(distance, 1.0);
    assert!(!warped);

    let client = &harness.viewer(viewer).client;
    assert!(client.prediction().trail().len() >= trail_before);
    let state = client.prediction().control_state().unwrap();
    assert_eq!(state.actual.position, Vec2::new(10.0, 9.0));
    // drawn between where it was predicted and where it is
    let rendered = client.control_rendered_state().unwrap().position;
    assert!(rendered.y > 9.0 && rendered.y < 10.0, "{rendered}");

    harness.step_n(30);
    let rendered = harness
        .viewer(viewer)
        .client
        .control_rendered_state()
        .unwrap()
        .position;
    assert!(rendered.distance(Vec2::new(10.0, 9.0)) < 0.01, "{rendered}");
}

#[test]
fn teleport_snaps_and_resets_trail() {
    let (mut harness, viewer, ship) = controlled_ship(Vec2::new(10.0, 10.0), LossyLink::reliable());
    // an observer sees the same ship through interpolation
    let observer = harness.add_viewer(LossyLink::reliable());
    harness.step_n(3);

    harness.server.teleport(&ship, Vec2::new(10.5, 10.0)).unwrap();
    harness.step();

    let corrections: Vec<_> = harness
        .viewer_mut(viewer)
        .client
        .events()
        .read::<CorrectedEvent>()
        .collect();
    assert_eq!(corrections.len(), 1);
    assert!(corrections[0].2, "teleport must warp even over half a unit");

    let client = &harness.viewer(viewer).client;
    assert_eq!(client.prediction().trail().len(), 1);
    assert_eq!(
        client.control_rendered_state().unwrap().position,
        Vec2::new(10.5, 10.0)
    );

    let ghost = harness.ghost_of(observer, &ship).unwrap();
    let seen = harness
        .viewer(observer)
        .client
        .rendered_state(&ghost)
        .unwrap();
    assert_eq!(seen.position, Vec2::new(10.5, 10.0));
}

#[test]
fn remote_ship_is_smoothed_for_observers() {
    init_logger();
    let mut harness = Harness::new(ServerConfig::default());
    let pilot = harness.add_viewer(LossyLink::reliable());
    let observer = harness.add_viewer(LossyLink::reliable());
    let ship = harness
        .server
        .spawn_entity(ShipState::new(Team::Red, Vec2::ZERO));
    let key = harness.viewer(pilot).key;
    harness.server.set_control(&key, Some(ship)).unwrap();
    harness.viewer_mut(pilot).input.thrust = Vec2::X;
    harness.step_n(40);

    let ghost = harness.ghost_of(observer, &ship).unwrap();
    let rendered = harness
        .viewer(observer)
        .client
        .rendered_state(&ghost)
        .unwrap();
    let authoritative = harness.server.entity(&ship).unwrap().position();
    assert!(rendered.position.x > 0.0);
    assert!(rendered.position.distance(authoritative) < 8.0);
}
