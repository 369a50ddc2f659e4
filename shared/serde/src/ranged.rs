use crate::{BitReader, BitWrite, SerdeErr};

/// Number of bits needed to hold any value of `[min, max]`,
/// i.e. `ceil(log2(max - min + 1))`.
pub fn bits_for_range(min: i64, max: i64) -> u8 {
    assert!(min <= max, "invalid range [{min}, {max}]");
    let span = (i128::from(max) - i128::from(min)) as u128;
    (u128::BITS - span.leading_zeros()) as u8
}

/// Writes the low `bits` bits of `value`, least significant first.
pub fn write_bits(writer: &mut dyn BitWrite, value: u64, bits: u8) {
    assert!(bits <= 64, "can't write more than 64 bits at once");
    for index in 0..bits {
        writer.write_bit((value >> index) & 1 != 0);
    }
}

pub fn read_bits(reader: &mut BitReader, bits: u8) -> Result<u64, SerdeErr> {
    assert!(bits <= 64, "can't read more than 64 bits at once");
    let remaining = reader.bits_remaining();
    if remaining < u32::from(bits) {
        return Err(SerdeErr::OutOfBits {
            requested: u32::from(bits),
            remaining,
        });
    }
    let mut value = 0u64;
    for index in 0..bits {
        if reader.read_bit()? {
            value |= 1 << index;
        }
    }
    Ok(value)
}

/// Writes `value` as an offset from `min`, packed into
/// [`bits_for_range`]`(min, max)` bits.
///
/// # Panics
///
/// Panics if `value` is outside `[min, max]`.
pub fn write_ranged_int(writer: &mut dyn BitWrite, value: i64, min: i64, max: i64) {
    if value < min || value > max {
        panic!("can't encode {value} in the range [{min}, {max}]");
    }
    let offset = (i128::from(value) - i128::from(min)) as u64;
    write_bits(writer, offset, bits_for_range(min, max));
}

pub fn read_ranged_int(reader: &mut BitReader, min: i64, max: i64) -> Result<i64, SerdeErr> {
    let offset = read_bits(reader, bits_for_range(min, max))?;
    let value = i128::from(min) + i128::from(offset);
    if value > i128::from(max) {
        return Err(SerdeErr::ValueOutOfRange {
            value,
            min: i128::from(min),
            max: i128::from(max),
        });
    }
    Ok(value as i64)
}
