use glam::Vec2;

use wraith_serde::{
    quantize_unit_float, read_compressed_point, read_unit_float, write_compressed_point,
    write_unit_float, BitReader, BitWrite, SerdeErr,
};

use crate::world::{
    control_state::{snap_vec, POSITION_GRID},
    kind::{GroupCodec, ObjectKind, Schema},
};

use super::group_name;

pub const MAX_WALL_THICKNESS: f32 = 32.0;
const THICKNESS_BITS: u8 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallGroup {
    Geometry,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WallState {
    pub start: Vec2,
    pub end: Vec2,
    pub thickness: f32,
}

impl WallState {
    pub fn new(start: Vec2, end: Vec2, thickness: f32) -> Self {
        let fraction = quantize_unit_float(thickness / MAX_WALL_THICKNESS, THICKNESS_BITS);
        Self {
            start: snap_vec(start, POSITION_GRID),
            end: snap_vec(end, POSITION_GRID),
            thickness: fraction * MAX_WALL_THICKNESS,
        }
    }

    /// Center of the wall segment
    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }
}

fn write_geometry(state: &WallState, writer: &mut dyn BitWrite) {
    write_compressed_point(writer, state.start, POSITION_GRID);
    write_compressed_point(writer, state.end, POSITION_GRID);
    write_unit_float(writer, state.thickness / MAX_WALL_THICKNESS, THICKNESS_BITS);
}

fn read_geometry(state: &mut WallState, reader: &mut BitReader) -> Result<(), SerdeErr> {
    state.start = read_compressed_point(reader, POSITION_GRID)?;
    state.end = read_compressed_point(reader, POSITION_GRID)?;
    state.thickness = read_unit_float(reader, THICKNESS_BITS)? * MAX_WALL_THICKNESS;
    Ok(())
}

impl Schema for WallState {
    const KIND: ObjectKind = ObjectKind::Wall;
    const GROUPS: &'static [GroupCodec<Self>] = &[GroupCodec {
        name: "Geometry",
        write: write_geometry,
        read: read_geometry,
    }];
}

group_name!(WallGroup, ObjectKind::Wall, WallState);
