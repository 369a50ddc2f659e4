use glam::Vec2;

use wraith_serde::{
    quantize_unit_float, read_compressed_point, read_enum, read_ranged_int, read_unit_float,
    write_compressed_point, write_enum, write_ranged_int, write_unit_float, BitReader, BitWrite,
    Serde, SerdeErr,
};

use crate::world::{
    control_state::{
        facing_to_step, step_to_facing, MotionState, FACING_STEPS, POSITION_GRID, VELOCITY_GRID,
    },
    kind::{GroupCodec, ObjectKind, Schema},
};

use super::{group_name, Team};

pub const TELEPORT_EPOCH_BITS: u8 = 3;
const TELEPORT_EPOCH_MAX: u8 = (1 << TELEPORT_EPOCH_BITS) - 1;
const HEALTH_BITS: u8 = 10;
const ENERGY_BITS: u8 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShipGroup {
    Spawn,
    Motion,
    Health,
    Status,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShipState {
    pub team: Team,
    pub motion: MotionState,
    /// Bumped on every explicit teleport, wrapping at 3 bits
    pub teleport_epoch: u8,
    health: f32,
    pub shield: bool,
    pub boosting: bool,
    energy: f32,
}

impl ShipState {
    pub fn new(team: Team, position: Vec2) -> Self {
        Self {
            team,
            motion: MotionState::new(position, Vec2::ZERO, 0.0),
            teleport_epoch: 0,
            health: 1.0,
            shield: false,
            boosting: false,
            energy: 1.0,
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    /// Stores health as the wire will deliver it
    pub fn set_health(&mut self, health: f32) {
        self.health = quantize_unit_float(health, HEALTH_BITS);
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn set_energy(&mut self, energy: f32) {
        self.energy = quantize_unit_float(energy, ENERGY_BITS);
    }

    /// Moves the ship without any travel in between and opens a new teleport
    /// epoch, which tells every receiver to snap instead of blend.
    pub fn teleport(&mut self, position: Vec2) {
        self.motion = MotionState::new(position, Vec2::ZERO, self.motion.facing);
        self.teleport_epoch = next_epoch(self.teleport_epoch);
    }
}

impl Default for ShipState {
    fn default() -> Self {
        Self::new(Team::Neutral, Vec2::ZERO)
    }
}

fn next_epoch(epoch: u8) -> u8 {
    if epoch >= TELEPORT_EPOCH_MAX {
        0
    } else {
        epoch + 1
    }
}

fn write_spawn(state: &ShipState, writer: &mut dyn BitWrite) {
    write_enum(writer, state.team);
}

fn read_spawn(state: &mut ShipState, reader: &mut BitReader) -> Result<(), SerdeErr> {
    state.team = read_enum(reader)?;
    Ok(())
}

fn write_motion(state: &ShipState, writer: &mut dyn BitWrite) {
    write_compressed_point(writer, state.motion.position, POSITION_GRID);
    write_compressed_point(writer, state.motion.velocity, VELOCITY_GRID);
    write_ranged_int(writer, facing_to_step(state.motion.facing), 0, FACING_STEPS - 1);
    write_ranged_int(
        writer,
        i64::from(state.teleport_epoch.min(TELEPORT_EPOCH_MAX)),
        0,
        i64::from(TELEPORT_EPOCH_MAX),
    );
}

fn read_motion(state: &mut ShipState, reader: &mut BitReader) -> Result<(), SerdeErr> {
    state.motion.position = read_compressed_point(reader, POSITION_GRID)?;
    state.motion.velocity = read_compressed_point(reader, VELOCITY_GRID)?;
    state.motion.facing = step_to_facing(read_ranged_int(reader, 0, FACING_STEPS - 1)?);
    state.teleport_epoch = read_ranged_int(reader, 0, i64::from(TELEPORT_EPOCH_MAX))? as u8;
    Ok(())
}

fn write_health(state: &ShipState, writer: &mut dyn BitWrite) {
    write_unit_float(writer, state.health, HEALTH_BITS);
}

fn read_health(state: &mut ShipState, reader: &mut BitReader) -> Result<(), SerdeErr> {
    state.health = read_unit_float(reader, HEALTH_BITS)?;
    Ok(())
}

fn write_status(state: &ShipState, writer: &mut dyn BitWrite) {
    state.shield.ser(writer);
    state.boosting.ser(writer);
    write_unit_float(writer, state.energy, ENERGY_BITS);
}

fn read_status(state: &mut ShipState, reader: &mut BitReader) -> Result<(), SerdeErr> {
    state.shield = bool::de(reader)?;
    state.boosting = bool::de(reader)?;
    state.energy = read_unit_float(reader, ENERGY_BITS)?;
    Ok(())
}

impl Schema for ShipState {
    const KIND: ObjectKind = ObjectKind::Ship;
    const GROUPS: &'static [GroupCodec<Self>] = &[
        GroupCodec {
            name: "Spawn",
            write: write_spawn,
            read: read_spawn,
        },
        GroupCodec {
            name: "Motion",
            write: write_motion,
            read: read_motion,
        },
        GroupCodec {
            name: "Health",
            write: write_health,
            read: read_health,
        },
        GroupCodec {
            name: "Status",
            write: write_status,
            read: read_status,
        },
    ];
}

group_name!(ShipGroup, ObjectKind::Ship, ShipState);
