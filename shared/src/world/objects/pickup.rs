use glam::Vec2;

use wraith_serde::{
    read_compressed_point, read_enum, write_compressed_point, write_enum, BitReader, BitWrite,
    Serde, SerdeErr, WireEnum,
};

use crate::world::{
    control_state::{snap_vec, POSITION_GRID},
    kind::{GroupCodec, ObjectKind, Schema},
};

use super::group_name;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PickupType {
    #[default]
    Health,
    Energy,
    Shield,
    Ammo,
}

impl WireEnum for PickupType {
    const TYPE_NAME: &'static str = "PickupType";
    const VARIANT_COUNT: u32 = 4;

    fn to_index(self) -> u32 {
        self as u32
    }

    fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(PickupType::Health),
            1 => Some(PickupType::Energy),
            2 => Some(PickupType::Shield),
            3 => Some(PickupType::Ammo),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupGroup {
    Spawn,
    Availability,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PickupState {
    pub position: Vec2,
    pub pickup_type: PickupType,
    pub available: bool,
}

impl PickupState {
    pub fn new(position: Vec2, pickup_type: PickupType) -> Self {
        Self {
            position: snap_vec(position, POSITION_GRID),
            pickup_type,
            available: true,
        }
    }
}

fn write_spawn(state: &PickupState, writer: &mut dyn BitWrite) {
    write_compressed_point(writer, state.position, POSITION_GRID);
    write_enum(writer, state.pickup_type);
}

fn read_spawn(state: &mut PickupState, reader: &mut BitReader) -> Result<(), SerdeErr> {
    state.position = read_compressed_point(reader, POSITION_GRID)?;
    state.pickup_type = read_enum(reader)?;
    Ok(())
}

fn write_availability(state: &PickupState, writer: &mut dyn BitWrite) {
    state.available.ser(writer);
}

fn read_availability(state: &mut PickupState, reader: &mut BitReader) -> Result<(), SerdeErr> {
    state.available = bool::de(reader)?;
    Ok(())
}

impl Schema for PickupState {
    const KIND: ObjectKind = ObjectKind::Pickup;
    const GROUPS: &'static [GroupCodec<Self>] = &[
        GroupCodec {
            name: "Spawn",
            write: write_spawn,
            read: read_spawn,
        },
        GroupCodec {
            name: "Availability",
            write: write_availability,
            read: read_availability,
        },
    ];
}

group_name!(PickupGroup, ObjectKind::Pickup, PickupState);
