/// SCENARIO TESTS: ghost lifecycle
///
/// Entities entering and leaving a viewer's scope, despawns, and a ghost
/// table too small for the world, all observed end to end through lossy
/// links.
use glam::Vec2;

use wraith_client::{CreatedEvent, DestroyedEvent, GhostEvent};
use wraith_server::{RadiusInterest, ServerConfig};
use wraith_shared::{ObjectKind, Protocol};
use wraith_test::{assert_in_sync, assert_replicated, Harness, LossyLink, TestWorld};

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

// ========== Initial Sync ==========

#[test]
fn arena_reaches_every_viewer() {
    init_logging();
    let mut harness = Harness::new(ServerConfig::default());
    let arena = TestWorld::spawn_arena(&mut harness.server);
    let clean = harness.add_viewer(LossyLink::reliable());
    let lossy = harness.add_viewer(LossyLink::new(7, 0.3));

    harness.step_n(30);
    harness.viewer_mut(lossy).downlink.set_loss_rate(0.0);
    harness.step_n(20);

    for viewer in [clean, lossy] {
        assert_eq!(harness.viewer(viewer).client.ghost_count(), arena.all().len());
        for net_id in arena.all() {
            assert_in_sync!(harness, viewer, net_id);
        }
    }
}

#[test]
fn every_proxy_is_announced_once() {
    init_logging();
    let mut harness = Harness::new(ServerConfig::default());
    let arena = TestWorld::spawn_arena(&mut harness.server);
    let viewer = harness.add_viewer(LossyLink::reliable());

    harness.step_n(10);

    let created: Vec<_> = harness
        .viewer_mut(viewer)
        .client
        .events()
        .read::<CreatedEvent>()
        .collect();
    assert_eq!(created.len(), arena.all().len());
    let walls = created
        .iter()
        .filter(|(_, kind)| *kind == ObjectKind::Wall)
        .count();
    assert_eq!(walls, arena.walls.len());
}

// ========== Scope Changes ==========

#[test]
fn leaving_the_radius_destroys_the_proxy_and_returning_recreates_it() {
    init_logging();
    let mut harness =
        Harness::new(ServerConfig::default()).with_interest(RadiusInterest::new(60.0));
    let arena = TestWorld::spawn_arena(&mut harness.server);
    let viewer = harness.add_viewer(LossyLink::new(11, 0.2));
    let key = harness.viewer(viewer).key;
    let (blue, red) = (arena.ships[0], arena.ships[1]);

    harness
        .server
        .set_viewer_focus(&key, Vec2::new(-50.0, 0.0))
        .unwrap();
    assert!(harness.step_until(60, |harness| harness
        .client_replica(viewer, &blue)
        .is_some()));
    assert!(harness.ghost_of(viewer, &red).is_none());
    // walls are always in scope
    for wall in &arena.walls {
        assert!(harness.step_until(60, |harness| harness
            .client_replica(viewer, wall)
            .is_some()));
    }
    harness.viewer_mut(viewer).client.take_events();

    harness
        .server
        .set_viewer_focus(&key, Vec2::new(50.0, 0.0))
        .unwrap();
    assert!(harness.step_until(60, |harness| {
        harness.client_replica(viewer, &red).is_some()
            && harness.ghost_of(viewer, &blue).is_none()
    }));
    harness.viewer_mut(viewer).downlink.set_loss_rate(0.0);
    harness.step_n(20);

    let client = &mut harness.viewer_mut(viewer).client;
    let destroyed: Vec<_> = client.events().read::<DestroyedEvent>().collect();
    assert!(destroyed.iter().any(|(_, kind)| *kind == ObjectKind::Ship));
    let focus = Vec2::new(50.0, 0.0);
    assert!(client.ghosts().all(|(_, replica)| {
        replica.kind() == ObjectKind::Wall || replica.position().distance(focus) <= 60.0
    }));
    assert_in_sync!(harness, viewer, red);
}

#[test]
fn despawn_reaches_every_viewer_through_loss() {
    init_logging();
    let mut harness = Harness::new(ServerConfig::default());
    let arena = TestWorld::spawn_arena(&mut harness.server);
    let first = harness.add_viewer(LossyLink::new(3, 0.4));
    let second = harness.add_viewer(LossyLink::reliable());

    harness.step_n(40);
    harness.viewer_mut(first).downlink.set_loss_rate(0.0);
    harness.step_n(10);
    for viewer in [first, second] {
        assert_replicated!(harness, viewer, arena.pickups[0]);
    }
    let expected = arena.all().len() - 1;

    harness.viewer_mut(first).downlink.set_loss_rate(0.4);
    harness.server.despawn_entity(&arena.pickups[0]).unwrap();
    harness.step_n(20);
    harness.viewer_mut(first).downlink.set_loss_rate(0.0);
    harness.step_n(20);

    for viewer in [first, second] {
        assert_eq!(harness.viewer(viewer).client.ghost_count(), expected);
        let connection = harness
            .server
            .connection(&harness.viewer(viewer).key)
            .unwrap();
        assert_eq!(connection.ghost_count(), expected);
        let events = harness.viewer_mut(viewer).client.take_events();
        assert!(events.iter().any(|event| matches!(
            event,
            GhostEvent::Destroyed {
                kind: ObjectKind::Pickup,
                ..
            }
        )));
    }
}

// ========== Ghost Table Pressure ==========

#[test]
fn deferred_entities_arrive_as_slots_free_up() {
    init_logging();
    let config = ServerConfig {
        protocol: Protocol {
            max_ghosts: 4,
            ..Protocol::default()
        },
        ..ServerConfig::default()
    };
    let mut harness = Harness::new(config);
    let ships = TestWorld::spawn_ship_line(&mut harness.server, 6, 10.0);
    let viewer = harness.add_viewer(LossyLink::new(5, 0.25));

    harness.step_n(20);
    assert_eq!(harness.viewer(viewer).client.ghost_count(), 4);
    let deferred: Vec<_> = ships
        .iter()
        .filter(|net_id| harness.ghost_of(viewer, net_id).is_none())
        .copied()
        .collect();
    assert_eq!(deferred.len(), 2);

    let bound: Vec<_> = ships
        .iter()
        .filter(|net_id| !deferred.contains(net_id))
        .copied()
        .collect();
    harness.server.despawn_entity(&bound[0]).unwrap();
    harness.server.despawn_entity(&bound[1]).unwrap();

    harness.step_n(30);
    harness.viewer_mut(viewer).downlink.set_loss_rate(0.0);
    harness.step_n(20);

    assert_eq!(harness.viewer(viewer).client.ghost_count(), 4);
    for net_id in deferred.iter().chain(&bound[2..]) {
        assert_in_sync!(harness, viewer, *net_id);
    }
}
