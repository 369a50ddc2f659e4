use glam::Vec2;

use wraith_serde::{
    quantize_unit_float, read_compressed_point, read_enum, read_unit_float,
    write_compressed_point, write_enum, write_unit_float, BitReader, BitWrite, SerdeErr,
};

use crate::world::{
    control_state::{snap_vec, POSITION_GRID},
    kind::{GroupCodec, ObjectKind, Schema},
};

use super::{group_name, Team};

pub const MAX_ZONE_RADIUS: f32 = 256.0;
const RADIUS_BITS: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneMarkerGroup {
    Geometry,
    Owner,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneMarkerState {
    pub position: Vec2,
    pub radius: f32,
    pub owner: Team,
}

impl ZoneMarkerState {
    pub fn new(position: Vec2, radius: f32) -> Self {
        let fraction = quantize_unit_float(radius / MAX_ZONE_RADIUS, RADIUS_BITS);
        Self {
            position: snap_vec(position, POSITION_GRID),
            radius: fraction * MAX_ZONE_RADIUS,
            owner: Team::Neutral,
        }
    }
}

fn write_geometry(state: &ZoneMarkerState, writer: &mut dyn BitWrite) {
    write_compressed_point(writer, state.position, POSITION_GRID);
    write_unit_float(writer, state.radius / MAX_ZONE_RADIUS, RADIUS_BITS);
}

fn read_geometry(state: &mut ZoneMarkerState, reader: &mut BitReader) -> Result<(), SerdeErr> {
    state.position = read_compressed_point(reader, POSITION_GRID)?;
    state.radius = read_unit_float(reader, RADIUS_BITS)? * MAX_ZONE_RADIUS;
    Ok(())
}

fn write_owner(state: &ZoneMarkerState, writer: &mut dyn BitWrite) {
    write_enum(writer, state.owner);
}

fn read_owner(state: &mut ZoneMarkerState, reader: &mut BitReader) -> Result<(), SerdeErr> {
    state.owner = read_enum(reader)?;
    Ok(())
}

impl Schema for ZoneMarkerState {
    const KIND: ObjectKind = ObjectKind::ZoneMarker;
    const GROUPS: &'static [GroupCodec<Self>] = &[
        GroupCodec {
            name: "Geometry",
            write: write_geometry,
            read: read_geometry,
        },
        GroupCodec {
            name: "Owner",
            write: write_owner,
            read: read_owner,
        },
    ];
}

group_name!(ZoneMarkerGroup, ObjectKind::ZoneMarker, ZoneMarkerState);
