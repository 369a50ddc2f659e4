use std::f32::consts::TAU;

use glam::Vec2;

use crate::{
    quantize_unit_float, read_bits, read_ranged_int, read_unit_float, write_bits,
    write_ranged_int, write_unit_float, BitReader, BitWrite, Serde, SerdeErr,
};

/// Magnitude widths, in bits per component, selectable by the 2-bit size class
/// that prefixes every compressed point.
pub const POINT_SIZE_CLASSES: [u8; 4] = [6, 12, 18, 26];

fn max_magnitude(bits: u8) -> u64 {
    (1u64 << bits) - 1
}

fn coord_to_step(value: f32, scale: f32) -> i64 {
    if value == 0.0 || value.is_nan() {
        return 0;
    }
    let limit = max_magnitude(POINT_SIZE_CLASSES[3]) as i64;
    // float to int casts saturate, so infinities land on the limit too
    let step = ((value / scale).round() as i64).clamp(-limit, limit);
    if step == 0 {
        if value < 0.0 {
            -1
        } else {
            1
        }
    } else {
        step
    }
}

fn step_to_coord(step: i64, scale: f32) -> f32 {
    if step == 0 {
        return 0.0;
    }
    step as f32 * scale
}

/// Returns exactly what [`read_compressed_point`] would produce for `point`.
pub fn quantize_point(point: Vec2, scale: f32) -> Vec2 {
    Vec2::new(
        step_to_coord(coord_to_step(point.x, scale), scale),
        step_to_coord(coord_to_step(point.y, scale), scale),
    )
}

/// Writes a point snapped to a grid of `scale` world units. A 2-bit size class
/// picks the smallest magnitude width that holds both components, then each
/// component is written as a sign bit plus magnitude.
pub fn write_compressed_point(writer: &mut dyn BitWrite, point: Vec2, scale: f32) {
    let x = coord_to_step(point.x, scale);
    let y = coord_to_step(point.y, scale);
    let largest = x.unsigned_abs().max(y.unsigned_abs());

    let class = POINT_SIZE_CLASSES
        .iter()
        .position(|bits| largest <= max_magnitude(*bits))
        .unwrap_or(POINT_SIZE_CLASSES.len() - 1);
    let bits = POINT_SIZE_CLASSES[class];

    write_bits(writer, class as u64, 2);
    for step in [x, y] {
        (step < 0).ser(writer);
        write_bits(writer, step.unsigned_abs(), bits);
    }
}

pub fn read_compressed_point(reader: &mut BitReader, scale: f32) -> Result<Vec2, SerdeErr> {
    let class = read_bits(reader, 2)? as usize;
    let bits = POINT_SIZE_CLASSES[class];

    let mut coords = [0.0f32; 2];
    for coord in coords.iter_mut() {
        let negative = bool::de(reader)?;
        let magnitude = read_bits(reader, bits)? as i64;
        let step = if negative { -magnitude } else { magnitude };
        *coord = step_to_coord(step, scale);
    }
    Ok(Vec2::new(coords[0], coords[1]))
}

/// Bit widths and bound used by [`write_compressed_velocity`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityEncoding {
    pub max_speed: f32,
    pub magnitude_bits: u8,
    pub angle_bits: u8,
}

impl VelocityEncoding {
    fn angle_steps(&self) -> i64 {
        1i64 << self.angle_bits
    }

    fn angle_step(&self) -> f32 {
        TAU / self.angle_steps() as f32
    }
}

impl Default for VelocityEncoding {
    fn default() -> Self {
        Self {
            max_speed: 1024.0,
            magnitude_bits: 12,
            angle_bits: 10,
        }
    }
}

/// Speed as an on-grid fraction of `max_speed`, and the heading step
fn velocity_steps(speed: f32, velocity: Vec2, encoding: &VelocityEncoding) -> (f32, i64) {
    let steps = encoding.angle_steps();
    let heading = velocity.y.atan2(velocity.x).rem_euclid(TAU);
    let angle = ((heading / encoding.angle_step()).round() as i64).rem_euclid(steps);
    let magnitude = quantize_unit_float(speed / encoding.max_speed, encoding.magnitude_bits);
    (magnitude, angle)
}

fn steps_to_velocity(magnitude: f32, angle: i64, encoding: &VelocityEncoding) -> Vec2 {
    let speed = magnitude * encoding.max_speed;
    Vec2::from_angle(angle as f32 * encoding.angle_step()) * speed
}

fn overflows(speed: f32, encoding: &VelocityEncoding) -> bool {
    !speed.is_normal() || speed > encoding.max_speed
}

/// Returns exactly what [`read_compressed_velocity`] would produce for
/// `velocity`. Authorities store projectile velocities through this so their
/// own state matches what receivers decode.
pub fn quantize_velocity(velocity: Vec2, encoding: &VelocityEncoding) -> Vec2 {
    if velocity == Vec2::ZERO {
        return Vec2::ZERO;
    }
    let speed = velocity.length();
    if overflows(speed, encoding) {
        return velocity;
    }
    let (magnitude, angle) = velocity_steps(speed, velocity, encoding);
    steps_to_velocity(magnitude, angle, encoding)
}

/// Writes a velocity as magnitude plus direction.
///
/// Layout: a moving flag (false means exactly zero), then an overflow flag.
/// Overflowing velocities (faster than `max_speed`, or too small to have a
/// normal length) are written as two raw `f32`s. Everything else is written as
/// a unit-float fraction of `max_speed` and a quantized heading.
pub fn write_compressed_velocity(
    writer: &mut dyn BitWrite,
    velocity: Vec2,
    encoding: &VelocityEncoding,
) {
    let moving = velocity != Vec2::ZERO;
    moving.ser(writer);
    if !moving {
        return;
    }

    let speed = velocity.length();
    let overflow = overflows(speed, encoding);
    overflow.ser(writer);
    if overflow {
        velocity.x.ser(writer);
        velocity.y.ser(writer);
        return;
    }

    let (magnitude, angle) = velocity_steps(speed, velocity, encoding);
    write_unit_float(writer, magnitude, encoding.magnitude_bits);
    write_ranged_int(writer, angle, 0, encoding.angle_steps() - 1);
}

pub fn read_compressed_velocity(
    reader: &mut BitReader,
    encoding: &VelocityEncoding,
) -> Result<Vec2, SerdeErr> {
    if !bool::de(reader)? {
        return Ok(Vec2::ZERO);
    }
    if bool::de(reader)? {
        let x = f32::de(reader)?;
        let y = f32::de(reader)?;
        return Ok(Vec2::new(x, y));
    }

    let magnitude = read_unit_float(reader, encoding.magnitude_bits)?;
    let angle = read_ranged_int(reader, 0, encoding.angle_steps() - 1)?;
    Ok(steps_to_velocity(magnitude, angle, encoding))
}
