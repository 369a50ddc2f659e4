/// SCENARIO TESTS: projectile flight and detonation
///
/// A launched projectile is extrapolated by viewers from its launch record
/// alone, and its detonation stops it where the authority stopped it.
use glam::Vec2;

use wraith_server::ServerConfig;
use wraith_shared::{NetId, ProjectileGroup, Replica};
use wraith_test::{assert_in_sync, Harness, LossyLink, TestWorld};

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn detonate(harness: &mut Harness, net_id: &NetId) {
    if let Some(Replica::Projectile(projectile)) = harness.server.entity_mut(net_id) {
        projectile.detonate();
    }
    harness
        .server
        .set_dirty(net_id, ProjectileGroup::Detonation)
        .unwrap();
}

fn server_position(harness: &Harness, net_id: &NetId) -> Vec2 {
    harness.server.entity(net_id).unwrap().position()
}

fn rendered_position(harness: &Harness, viewer: usize, net_id: &NetId) -> Vec2 {
    let ghost = harness.ghost_of(viewer, net_id).unwrap();
    harness
        .viewer(viewer)
        .client
        .rendered_state(&ghost)
        .unwrap()
        .position
}

// ========== Flight ==========

#[test]
fn launch_velocity_matches_the_authority_exactly() {
    init_logging();
    let mut harness = Harness::new(ServerConfig::default());
    let missile = TestWorld::launch(&mut harness.server, Vec2::ZERO, Vec2::new(300.0, -120.0));
    let viewer = harness.add_viewer(LossyLink::reliable());

    harness.step_n(3);

    let authority = harness.server.entity(&missile).unwrap().motion().unwrap();
    let proxy = harness
        .client_replica(viewer, &missile)
        .unwrap()
        .motion()
        .unwrap();
    assert_eq!(proxy.velocity, authority.velocity);

    // the client draws one frame ahead of the last simulated tick
    let frame = harness.server.config().protocol.tick_interval.as_secs_f32();
    let ahead = authority.position + authority.velocity * frame;
    assert!(rendered_position(&harness, viewer, &missile).distance(ahead) < 1.0);
}

// ========== Detonation ==========

#[test]
fn detonated_projectile_stops_on_the_client() {
    init_logging();
    let mut harness = Harness::new(ServerConfig::default());
    let missile = TestWorld::launch(&mut harness.server, Vec2::ZERO, Vec2::new(300.0, -120.0));
    let viewer = harness.add_viewer(LossyLink::reliable());

    harness.step_n(5);
    detonate(&mut harness, &missile);
    let stopped = server_position(&harness, &missile);

    harness.step_n(30);
    assert_eq!(server_position(&harness, &missile), stopped);
    assert_in_sync!(harness, viewer, missile);

    let rendered = rendered_position(&harness, viewer, &missile);
    assert!(
        rendered.distance(stopped) < 0.5,
        "detonated projectile drawn at {rendered}, stopped at {stopped}"
    );
    harness.step_n(10);
    assert!(rendered_position(&harness, viewer, &missile).distance(rendered) < 0.05);
}

#[test]
fn detonation_survives_loss() {
    init_logging();
    let mut harness = Harness::new(ServerConfig::default());
    let launch_at = Vec2::new(-40.0, 10.0);
    let missile = TestWorld::launch(&mut harness.server, launch_at, Vec2::new(0.0, 250.0));
    let viewer = harness.add_viewer(LossyLink::new(21, 0.4));

    harness.step_n(20);
    detonate(&mut harness, &missile);
    harness.step_n(20);
    harness.viewer_mut(viewer).downlink.set_loss_rate(0.0);
    harness.step_n(30);

    assert_in_sync!(harness, viewer, missile);
    let stopped = server_position(&harness, &missile);
    assert!(rendered_position(&harness, viewer, &missile).distance(stopped) < 0.5);
}
