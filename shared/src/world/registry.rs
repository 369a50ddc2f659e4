use super::{
    kind::{ObjectKind, Schema},
    objects::{PickupState, ProjectileState, ShipState, WallState, ZoneMarkerState},
    replica::Replica,
};

/// What a receiver needs to know about an object kind it has never seen.
pub struct KindEntry {
    pub kind: ObjectKind,
    pub name: &'static str,
    pub group_count: u8,
    pub factory: fn() -> Replica,
}

/// One entry per [`ObjectKind`], in wire tag order.
pub static KIND_REGISTRY: [KindEntry; 5] = [
    KindEntry {
        kind: ObjectKind::Ship,
        name: "Ship",
        group_count: ShipState::GROUPS.len() as u8,
        factory: || Replica::Ship(ShipState::default()),
    },
    KindEntry {
        kind: ObjectKind::Pickup,
        name: "Pickup",
        group_count: PickupState::GROUPS.len() as u8,
        factory: || Replica::Pickup(PickupState::default()),
    },
    KindEntry {
        kind: ObjectKind::Wall,
        name: "Wall",
        group_count: WallState::GROUPS.len() as u8,
        factory: || Replica::Wall(WallState::default()),
    },
    KindEntry {
        kind: ObjectKind::ZoneMarker,
        name: "ZoneMarker",
        group_count: ZoneMarkerState::GROUPS.len() as u8,
        factory: || Replica::ZoneMarker(ZoneMarkerState::default()),
    },
    KindEntry {
        kind: ObjectKind::Projectile,
        name: "Projectile",
        group_count: ProjectileState::GROUPS.len() as u8,
        factory: || Replica::Projectile(ProjectileState::default()),
    },
];

pub fn kind_entry(kind: ObjectKind) -> &'static KindEntry {
    &KIND_REGISTRY[kind as usize]
}

/// Builds an empty proxy of `kind`, ready to have a full record applied.
pub fn create_proxy(kind: ObjectKind) -> Replica {
    (kind_entry(kind).factory)()
}
