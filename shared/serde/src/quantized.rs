use crate::{read_bits, write_bits, BitReader, BitWrite, Serde, SerdeErr};

fn unit_steps(bits: u8) -> u64 {
    assert!((1..=24).contains(&bits), "unit floats use between 1 and 24 bits");
    (1u64 << bits) - 1
}

fn signed_steps(bits: u8) -> u64 {
    assert!(
        (2..=25).contains(&bits),
        "quantized floats use between 2 and 25 bits"
    );
    (1u64 << (bits - 1)) - 1
}

fn unit_to_step(value: f32, steps: u64) -> u64 {
    // NaN clamps to zero
    let clamped = if value > 0.0 { value.min(1.0) } else { 0.0 };
    let step = (clamped * steps as f32).round() as u64;
    if step == 0 && clamped > 0.0 {
        1
    } else {
        step
    }
}

fn step_to_unit(step: u64, steps: u64) -> f32 {
    step as f32 / steps as f32
}

/// Writes a value in `[0, 1]` using `bits` bits. Values outside of the range
/// are clamped. Zero is exact, and any positive value writes at least one step.
pub fn write_unit_float(writer: &mut dyn BitWrite, value: f32, bits: u8) {
    let steps = unit_steps(bits);
    write_bits(writer, unit_to_step(value, steps), bits);
}

pub fn read_unit_float(reader: &mut BitReader, bits: u8) -> Result<f32, SerdeErr> {
    let steps = unit_steps(bits);
    let step = read_bits(reader, bits)?;
    Ok(step_to_unit(step, steps))
}

/// Returns exactly what [`read_unit_float`] would produce for `value`.
pub fn quantize_unit_float(value: f32, bits: u8) -> f32 {
    let steps = unit_steps(bits);
    step_to_unit(unit_to_step(value, steps), steps)
}

fn signed_to_step(value: f32, steps: u64, scale: f32) -> (bool, u64) {
    if value == 0.0 || value.is_nan() {
        return (false, 0);
    }
    let magnitude = (value.abs() / scale).min(1.0);
    let mut step = (magnitude * steps as f32).round() as u64;
    if step == 0 {
        step = 1;
    }
    (value < 0.0, step)
}

fn step_to_signed(negative: bool, step: u64, steps: u64, scale: f32) -> f32 {
    if step == 0 {
        return 0.0;
    }
    let magnitude = step as f32 / steps as f32 * scale;
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Writes a bounded real in `[-scale, scale]` as a sign bit followed by
/// `bits - 1` magnitude bits. Out-of-range values clamp to the bound.
/// Zero (either sign) decodes to exactly zero, and no nonzero value
/// decodes to zero.
pub fn write_quantized_float(writer: &mut dyn BitWrite, value: f32, bits: u8, scale: f32) {
    let steps = signed_steps(bits);
    let (negative, step) = signed_to_step(value, steps, scale);
    negative.ser(writer);
    write_bits(writer, step, bits - 1);
}

pub fn read_quantized_float(
    reader: &mut BitReader,
    bits: u8,
    scale: f32,
) -> Result<f32, SerdeErr> {
    let steps = signed_steps(bits);
    let negative = bool::de(reader)?;
    let step = read_bits(reader, bits - 1)?;
    Ok(step_to_signed(negative, step, steps, scale))
}

/// Returns exactly what [`read_quantized_float`] would produce for `value`.
/// Simulation code uses this to keep local state on the wire grid.
pub fn quantize_float(value: f32, bits: u8, scale: f32) -> f32 {
    let steps = signed_steps(bits);
    let (negative, step) = signed_to_step(value, steps, scale);
    step_to_signed(negative, step, steps, scale)
}
