//! # Wraith Serde
//! Bit-level read/write primitives shared by the wraith server & client crates.
//!
//! Every object kind serializes itself through these functions in a fixed
//! order. A reader that diverges from the writer's order corrupts the rest of
//! the stream, so callers must treat any [`SerdeErr`] as fatal for the packet.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_counter;
mod bit_reader;
mod bit_writer;
mod compressed;
mod constants;
mod error;
mod quantized;
mod ranged;
mod serde;
mod wire_enum;

pub use bit_counter::BitCounter;
pub use bit_reader::BitReader;
pub use bit_writer::{BitWrite, BitWriter};
pub use compressed::{
    quantize_point, quantize_velocity, read_compressed_point, read_compressed_velocity,
    write_compressed_point, write_compressed_velocity, VelocityEncoding, POINT_SIZE_CLASSES,
};
pub use constants::{MTU_SIZE_BITS, MTU_SIZE_BYTES};
pub use error::SerdeErr;
pub use quantized::{
    quantize_float, quantize_unit_float, read_quantized_float, read_unit_float,
    write_quantized_float, write_unit_float,
};
pub use ranged::{bits_for_range, read_bits, read_ranged_int, write_bits, write_ranged_int};
pub use serde::{ConstBitLength, Serde};
pub use wire_enum::{read_enum, write_enum, WireEnum};
