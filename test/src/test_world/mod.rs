use glam::Vec2;

use wraith_server::ReplicationServer;
use wraith_shared::{
    NetId, PickupState, PickupType, ProjectileState, ShipState, Team, WallState, Weapon,
    ZoneMarkerState,
};

/// Entities spawned by [`TestWorld::spawn_arena`]
#[derive(Clone, Debug, Default)]
pub struct Arena {
    pub ships: Vec<NetId>,
    pub pickups: Vec<NetId>,
    pub walls: Vec<NetId>,
    pub zones: Vec<NetId>,
    pub projectiles: Vec<NetId>,
}

impl Arena {
    pub fn all(&self) -> Vec<NetId> {
        let mut all = Vec::new();
        all.extend(&self.ships);
        all.extend(&self.pickups);
        all.extend(&self.walls);
        all.extend(&self.zones);
        all.extend(&self.projectiles);
        all
    }
}

/// Builders for populated server worlds
pub struct TestWorld;

impl TestWorld {
    /// A small square arena: four walls, a ship per team, a pickup of each
    /// type, a zone marker in the middle and a mine resting near the red ship
    pub fn spawn_arena(server: &mut ReplicationServer) -> Arena {
        let mut arena = Arena::default();
        let corners = [
            Vec2::new(-100.0, -100.0),
            Vec2::new(100.0, -100.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(-100.0, 100.0),
        ];
        for (index, start) in corners.iter().enumerate() {
            let end = corners[(index + 1) % corners.len()];
            arena
                .walls
                .push(server.spawn_entity(WallState::new(*start, end, 4.0)));
        }

        for (team, x) in [(Team::Blue, -50.0), (Team::Red, 50.0)] {
            arena
                .ships
                .push(server.spawn_entity(ShipState::new(team, Vec2::new(x, 0.0))));
        }

        for (index, pickup_type) in [
            PickupType::Health,
            PickupType::Energy,
            PickupType::Shield,
            PickupType::Ammo,
        ]
        .into_iter()
        .enumerate()
        {
            let position = Vec2::new(-30.0 + 20.0 * index as f32, 60.0);
            arena
                .pickups
                .push(server.spawn_entity(PickupState::new(position, pickup_type)));
        }

        arena
            .zones
            .push(server.spawn_entity(ZoneMarkerState::new(Vec2::ZERO, 25.0)));

        arena.projectiles.push(server.spawn_entity(ProjectileState::new(
            Vec2::new(50.0, 20.0),
            Vec2::ZERO,
            Weapon::Mine,
        )));
        arena
    }

    /// A projectile launched from `position`
    pub fn launch(server: &mut ReplicationServer, position: Vec2, velocity: Vec2) -> NetId {
        server.spawn_entity(ProjectileState::new(position, velocity, Weapon::Missile))
    }

    /// `count` neutral ships on a line, `spacing` units apart
    pub fn spawn_ship_line(server: &mut ReplicationServer, count: usize, spacing: f32) -> Vec<NetId> {
        (0..count)
            .map(|index| {
                let position = Vec2::new(index as f32 * spacing, 0.0);
                server.spawn_entity(ShipState::new(Team::Neutral, position))
            })
            .collect()
    }
}
