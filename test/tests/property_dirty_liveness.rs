/// PROPERTY-BASED TESTS: end-to-end convergence under loss
///
/// Whatever mix of changes the authority makes and whichever packets the link
/// drops, once the link stops losing packets every client proxy converges to
/// the authority's state.
use proptest::prelude::*;

use wraith_server::ServerConfig;
use wraith_shared::{PickupGroup, Replica, ShipGroup};
use wraith_test::{assert_in_sync, Harness, LossyLink, TestWorld};

#[derive(Clone, Debug)]
enum Change {
    Health { ship: usize, health: f32 },
    Shield { ship: usize },
    Availability { pickup: usize },
    Idle,
}

fn change() -> impl Strategy<Value = Change> {
    prop_oneof![
        (0usize..2, 0.0f32..=1.0).prop_map(|(ship, health)| Change::Health { ship, health }),
        (0usize..2).prop_map(|ship| Change::Shield { ship }),
        (0usize..4).prop_map(|pickup| Change::Availability { pickup }),
        Just(Change::Idle),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_proxies_converge_after_loss_stops(
        seed in any::<u64>(),
        loss_rate in 0.0f32..0.7,
        changes in prop::collection::vec(change(), 1..60),
    ) {
        let mut harness = Harness::new(ServerConfig::default());
        let arena = TestWorld::spawn_arena(&mut harness.server);
        let first = harness.add_viewer(LossyLink::new(seed, loss_rate));
        let second = harness.add_viewer(LossyLink::new(seed.wrapping_add(1), loss_rate / 2.0));

        for change in changes {
            match change {
                Change::Health { ship, health } => {
                    let net_id = arena.ships[ship];
                    if let Some(Replica::Ship(state)) = harness.server.entity_mut(&net_id) {
                        state.set_health(health);
                    }
                    harness.server.set_dirty(&net_id, ShipGroup::Health).unwrap();
                }
                Change::Shield { ship } => {
                    let net_id = arena.ships[ship];
                    if let Some(Replica::Ship(state)) = harness.server.entity_mut(&net_id) {
                        state.shield = !state.shield;
                    }
                    harness.server.set_dirty(&net_id, ShipGroup::Status).unwrap();
                }
                Change::Availability { pickup } => {
                    let net_id = arena.pickups[pickup];
                    if let Some(Replica::Pickup(state)) = harness.server.entity_mut(&net_id) {
                        state.available = !state.available;
                    }
                    harness.server.set_dirty(&net_id, PickupGroup::Availability).unwrap();
                }
                Change::Idle => {}
            }
            harness.step();
        }

        for viewer in harness.viewers.iter_mut() {
            viewer.downlink.set_loss_rate(0.0);
        }
        harness.step_n(40);

        for viewer in [first, second] {
            prop_assert!(!harness.viewer(viewer).client.is_poisoned());
            for net_id in arena.all() {
                assert_in_sync!(harness, viewer, net_id);
            }
        }
    }
}
