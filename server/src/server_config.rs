use std::{default::Default, time::Duration};

use wraith_shared::{ObjectKind, PacketHeader, Protocol, ShipDynamics, MTU_SIZE_BITS};

/// Contains Config properties which will be used by the Server
#[derive(Clone)]
pub struct ServerConfig {
    /// Wire settings shared with every client
    pub protocol: Protocol,
    /// Used to rank records competing for space in a packet
    pub scheduler: SchedulerConfig,
    /// Bits available to one viewer's packet each tick
    pub bit_budget: u32,
    /// A packet neither acknowledged nor reported lost within this window is
    /// treated as lost
    pub retransmit_window: Duration,
    /// Movement tuning, must match the clients'
    pub dynamics: ShipDynamics,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            scheduler: SchedulerConfig::default(),
            bit_budget: MTU_SIZE_BITS,
            retransmit_window: Duration::from_millis(500),
            dynamics: ShipDynamics::default(),
        }
    }
}

impl ServerConfig {
    /// Smallest budget that still fits the largest packet header and the
    /// record terminator
    pub fn min_bit_budget(&self) -> u32 {
        PacketHeader::max_bit_length(&self.protocol) + 1
    }

    /// `bit_budget`, raised to [`ServerConfig::min_bit_budget`] if it is below
    pub fn packet_bit_budget(&self) -> u32 {
        self.bit_budget.max(self.min_bit_budget())
    }
}

/// Weights of the priority score
/// `kind_weight - distance * distance_scale + staleness * staleness_step`.
#[derive(Clone, Debug, PartialEq)]
pub struct SchedulerConfig {
    pub ship_weight: f32,
    pub projectile_weight: f32,
    pub pickup_weight: f32,
    pub zone_marker_weight: f32,
    pub wall_weight: f32,
    /// Score lost per world unit between the viewer and the entity
    pub distance_scale: f32,
    /// Score gained per tick an entity with pending changes was left out
    pub staleness_step: f32,
    /// Stop filling a packet after this many records in a row did not fit
    pub max_consecutive_skips: u32,
}

impl SchedulerConfig {
    pub fn kind_weight(&self, kind: ObjectKind) -> f32 {
        match kind {
            ObjectKind::Ship => self.ship_weight,
            ObjectKind::Projectile => self.projectile_weight,
            ObjectKind::Pickup => self.pickup_weight,
            ObjectKind::ZoneMarker => self.zone_marker_weight,
            ObjectKind::Wall => self.wall_weight,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            ship_weight: 10.0,
            projectile_weight: 8.0,
            pickup_weight: 4.0,
            zone_marker_weight: 3.0,
            wall_weight: 2.0,
            distance_scale: 0.01,
            staleness_step: 1.0,
            max_consecutive_skips: 4,
        }
    }
}
