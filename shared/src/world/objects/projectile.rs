use glam::Vec2;

use wraith_serde::{
    quantize_velocity, read_compressed_point, read_compressed_velocity, read_enum,
    write_compressed_point, write_compressed_velocity, write_enum, BitReader, BitWrite, Serde,
    SerdeErr, VelocityEncoding, WireEnum,
};

use crate::world::{
    control_state::{snap_vec, POSITION_GRID},
    kind::{GroupCodec, ObjectKind, Schema},
};

use super::group_name;

/// Projectiles are fast and short lived, so their velocity is sent as a
/// heading plus a fraction of this top speed.
pub const PROJECTILE_VELOCITY: VelocityEncoding = VelocityEncoding {
    max_speed: 1024.0,
    magnitude_bits: 12,
    angle_bits: 10,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Weapon {
    #[default]
    Blaster,
    Missile,
    Mine,
}

impl WireEnum for Weapon {
    const TYPE_NAME: &'static str = "Weapon";
    const VARIANT_COUNT: u32 = 3;

    fn to_index(self) -> u32 {
        self as u32
    }

    fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Weapon::Blaster),
            1 => Some(Weapon::Missile),
            2 => Some(Weapon::Mine),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileGroup {
    Launch,
    Detonation,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectileState {
    pub position: Vec2,
    velocity: Vec2,
    pub weapon: Weapon,
    pub detonated: bool,
}

impl ProjectileState {
    pub fn new(position: Vec2, velocity: Vec2, weapon: Weapon) -> Self {
        Self {
            position: snap_vec(position, POSITION_GRID),
            velocity: quantize_velocity(velocity, &PROJECTILE_VELOCITY),
            weapon,
            detonated: false,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Stores velocity as the wire will deliver it
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = quantize_velocity(velocity, &PROJECTILE_VELOCITY);
    }

    /// Stops the projectile where it is. The `Detonation` group carries that
    /// final position.
    pub fn detonate(&mut self) {
        self.detonated = true;
    }

    /// Flight is fully described by the launch record, so advancing a
    /// projectile never raises a dirty bit.
    pub fn advance(&mut self, seconds: f32) {
        if !self.detonated {
            self.position = snap_vec(self.position + self.velocity * seconds, POSITION_GRID);
        }
    }
}

fn write_launch(state: &ProjectileState, writer: &mut dyn BitWrite) {
    write_compressed_point(writer, state.position, POSITION_GRID);
    write_compressed_velocity(writer, state.velocity, &PROJECTILE_VELOCITY);
    write_enum(writer, state.weapon);
}

fn read_launch(state: &mut ProjectileState, reader: &mut BitReader) -> Result<(), SerdeErr> {
    state.position = read_compressed_point(reader, POSITION_GRID)?;
    state.velocity = read_compressed_velocity(reader, &PROJECTILE_VELOCITY)?;
    state.weapon = read_enum(reader)?;
    Ok(())
}

fn write_detonation(state: &ProjectileState, writer: &mut dyn BitWrite) {
    state.detonated.ser(writer);
    if state.detonated {
        write_compressed_point(writer, state.position, POSITION_GRID);
    }
}

fn read_detonation(state: &mut ProjectileState, reader: &mut BitReader) -> Result<(), SerdeErr> {
    state.detonated = bool::de(reader)?;
    if state.detonated {
        state.position = read_compressed_point(reader, POSITION_GRID)?;
    }
    Ok(())
}

impl Schema for ProjectileState {
    const KIND: ObjectKind = ObjectKind::Projectile;
    const GROUPS: &'static [GroupCodec<Self>] = &[
        GroupCodec {
            name: "Launch",
            write: write_launch,
            read: read_launch,
        },
        GroupCodec {
            name: "Detonation",
            write: write_detonation,
            read: read_detonation,
        },
    ];
}

group_name!(ProjectileGroup, ObjectKind::Projectile, ProjectileState);
