/// PROPERTY-BASED TESTS: scheduler fairness
///
/// With equal weights and a bit budget too small for everyone, every entity
/// with pending changes still gets a record through within a bounded number
/// of ticks: the staleness bonus rotates the packet among them.
use std::time::{Duration, Instant};

use glam::Vec2;
use proptest::prelude::*;

use wraith_server::{ReplicationServer, ScopeAll, ServerConfig};
use wraith_shared::{ShipGroup, ShipState, Team};
use wraith_test::inspect_packet;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_every_dirty_entity_is_sent_within_bound(
        ship_count in 2usize..24,
        bit_budget in 160u32..480,
    ) {
        let config = ServerConfig {
            bit_budget,
            ..ServerConfig::default()
        };
        let mut server = ReplicationServer::new(config);
        let protocol = server.config().protocol.clone();
        let viewer = server.connect_viewer();
        let ships: Vec<_> = (0..ship_count)
            .map(|_| server.spawn_entity(ShipState::new(Team::Neutral, Vec2::ZERO)))
            .collect();

        let mut now = Instant::now();
        let settle = 3 * ship_count;
        let measure = 4 * ship_count;
        let mut sent_per_ship = vec![0usize; ship_count];

        for tick in 0..settle + measure {
            for ship in &ships {
                server.set_dirty(ship, ShipGroup::Health).unwrap();
            }
            let (_, index, bytes) = server.send_all_packets(now, &ScopeAll).remove(0);
            let packet = inspect_packet(&bytes, &protocol).unwrap();
            prop_assert!(!packet.records.is_empty(), "nothing fit at tick {}", tick);
            server.on_packet_acked(&viewer, index);
            now += Duration::from_millis(32);

            if tick < settle {
                continue;
            }
            let connection = server.connection(&viewer).unwrap();
            for (position, ship) in ships.iter().enumerate() {
                let staleness = connection.staleness(ship);
                prop_assert!(
                    staleness as usize <= ship_count,
                    "{} waited {} ticks with {} ships",
                    ship,
                    staleness,
                    ship_count
                );
                if staleness == 0 {
                    sent_per_ship[position] += 1;
                }
            }
        }

        for (position, sent) in sent_per_ship.iter().enumerate() {
            prop_assert!(*sent > 0, "ship {} never sent", position);
        }
    }
}
