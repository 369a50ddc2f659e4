use glam::Vec2;

use wraith_serde::{BitReader, BitWrite, SerdeErr};

use crate::simulation::{coast, ShipDynamics};

use super::{
    control_state::MotionState,
    host::diff_mask::DiffMask,
    kind::{GroupName, ObjectKind, Schema},
    objects::{
        PickupState, ProjectileGroup, ProjectileState, ShipGroup, ShipState, WallState,
        ZoneMarkerState,
    },
};

/// State of one replicated object, tagged by kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Replica {
    Ship(ShipState),
    Pickup(PickupState),
    Wall(WallState),
    ZoneMarker(ZoneMarkerState),
    Projectile(ProjectileState),
}

macro_rules! dispatch {
    ($replica:expr, $state:ident => $body:expr) => {
        match $replica {
            Replica::Ship($state) => $body,
            Replica::Pickup($state) => $body,
            Replica::Wall($state) => $body,
            Replica::ZoneMarker($state) => $body,
            Replica::Projectile($state) => $body,
        }
    };
}

fn write_group_of<S: Schema>(state: &S, group: u8, writer: &mut dyn BitWrite) {
    let Some(codec) = S::GROUPS.get(usize::from(group)) else {
        panic!("{} has no group {group}", S::KIND.name());
    };
    (codec.write)(state, writer);
}

fn read_group_of<S: Schema>(
    state: &mut S,
    group: u8,
    reader: &mut BitReader,
) -> Result<(), SerdeErr> {
    let Some(codec) = S::GROUPS.get(usize::from(group)) else {
        panic!("{} has no group {group}", S::KIND.name());
    };
    (codec.read)(state, reader)
}

fn group_name_of<S: Schema>(_: &S, group: u8) -> &'static str {
    S::GROUPS
        .get(usize::from(group))
        .map(|codec| codec.name)
        .unwrap_or("<unknown>")
}

fn group_count_of<S: Schema>(_: &S) -> u8 {
    S::GROUPS.len() as u8
}

impl Replica {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Replica::Ship(_) => ObjectKind::Ship,
            Replica::Pickup(_) => ObjectKind::Pickup,
            Replica::Wall(_) => ObjectKind::Wall,
            Replica::ZoneMarker(_) => ObjectKind::ZoneMarker,
            Replica::Projectile(_) => ObjectKind::Projectile,
        }
    }

    pub fn group_count(&self) -> u8 {
        dispatch!(self, state => group_count_of(state))
    }

    pub fn group_name(&self, group: u8) -> &'static str {
        dispatch!(self, state => group_name_of(state, group))
    }

    /// Writes one field group. Panics if the kind has no such group.
    pub fn write_group(&self, group: u8, writer: &mut dyn BitWrite) {
        dispatch!(self, state => write_group_of(state, group, writer))
    }

    pub fn read_group(&mut self, group: u8, reader: &mut BitReader) -> Result<(), SerdeErr> {
        dispatch!(self, state => read_group_of(state, group, reader))
    }

    /// Position used for interest and priority
    pub fn position(&self) -> Vec2 {
        match self {
            Replica::Ship(ship) => ship.motion.position,
            Replica::Pickup(pickup) => pickup.position,
            Replica::Wall(wall) => wall.midpoint(),
            Replica::ZoneMarker(zone) => zone.position,
            Replica::Projectile(projectile) => projectile.position,
        }
    }

    /// Kinematic state of kinds that move, used for interpolation
    pub fn motion(&self) -> Option<MotionState> {
        match self {
            Replica::Ship(ship) => Some(ship.motion),
            Replica::Projectile(projectile) => Some(MotionState {
                position: projectile.position,
                velocity: if projectile.detonated {
                    Vec2::ZERO
                } else {
                    projectile.velocity()
                },
                facing: projectile.velocity().to_angle(),
            }),
            _ => None,
        }
    }

    /// Groups whose arrival can change [`Replica::motion`]. Empty for kinds
    /// that never move.
    pub fn motion_groups(&self) -> DiffMask {
        let mut groups = DiffMask::new();
        match self {
            Replica::Ship(_) => groups.set_bit(ShipGroup::Motion.index(), true),
            Replica::Projectile(_) => {
                groups.set_bit(ProjectileGroup::Launch.index(), true);
                groups.set_bit(ProjectileGroup::Detonation.index(), true);
            }
            Replica::Pickup(_) | Replica::Wall(_) | Replica::ZoneMarker(_) => {}
        }
        groups
    }

    pub fn teleport_epoch(&self) -> u8 {
        match self {
            Replica::Ship(ship) => ship.teleport_epoch,
            _ => 0,
        }
    }

    pub fn as_ship(&self) -> Option<&ShipState> {
        match self {
            Replica::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_ship_mut(&mut self) -> Option<&mut ShipState> {
        match self {
            Replica::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    /// Advances an object nobody controls by `seconds` and returns the groups
    /// that changed. Static kinds and projectiles never dirty themselves.
    pub fn simulate(&mut self, seconds: f32, dynamics: &ShipDynamics) -> DiffMask {
        let mut changed = DiffMask::new();
        match self {
            Replica::Ship(ship) => {
                let before = ship.motion;
                coast(&mut ship.motion, seconds, dynamics);
                if !ship.motion.bit_identical(&before) {
                    changed.set_bit(ShipGroup::Motion.index(), true);
                }
            }
            Replica::Projectile(projectile) => projectile.advance(seconds),
            Replica::Pickup(_) | Replica::Wall(_) | Replica::ZoneMarker(_) => {}
        }
        changed
    }
}

impl From<ShipState> for Replica {
    fn from(state: ShipState) -> Self {
        Replica::Ship(state)
    }
}

impl From<PickupState> for Replica {
    fn from(state: PickupState) -> Self {
        Replica::Pickup(state)
    }
}

impl From<WallState> for Replica {
    fn from(state: WallState) -> Self {
        Replica::Wall(state)
    }
}

impl From<ZoneMarkerState> for Replica {
    fn from(state: ZoneMarkerState) -> Self {
        Replica::ZoneMarker(state)
    }
}

impl From<ProjectileState> for Replica {
    fn from(state: ProjectileState) -> Self {
        Replica::Projectile(state)
    }
}
