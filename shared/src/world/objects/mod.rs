mod pickup;
mod projectile;
mod ship;
mod wall;
mod zone_marker;

pub use pickup::{PickupGroup, PickupState, PickupType};
pub use projectile::{ProjectileGroup, ProjectileState, Weapon, PROJECTILE_VELOCITY};
pub use ship::{ShipGroup, ShipState, TELEPORT_EPOCH_BITS};
pub use wall::{WallGroup, WallState, MAX_WALL_THICKNESS};
pub use zone_marker::{ZoneMarkerGroup, ZoneMarkerState, MAX_ZONE_RADIUS};

use wraith_serde::WireEnum;

/// Side an object belongs to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Team {
    #[default]
    Neutral,
    Blue,
    Red,
}

impl WireEnum for Team {
    const TYPE_NAME: &'static str = "Team";
    const VARIANT_COUNT: u32 = 3;

    fn to_index(self) -> u32 {
        self as u32
    }

    fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Team::Neutral),
            1 => Some(Team::Blue),
            2 => Some(Team::Red),
            _ => None,
        }
    }
}

macro_rules! group_name {
    ($group:ty, $kind:expr, $state:ty) => {
        impl crate::world::kind::GroupName for $group {
            const KIND: crate::world::kind::ObjectKind = $kind;

            fn index(self) -> u8 {
                self as u8
            }

            fn name(self) -> &'static str {
                <$state as crate::world::kind::Schema>::GROUPS[self as usize].name
            }
        }
    };
}

pub(crate) use group_name;
