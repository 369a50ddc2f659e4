/// Largest payload a single outgoing datagram may carry, in bytes.
pub const MTU_SIZE_BYTES: usize = 430;
/// Largest payload a single outgoing datagram may carry, in bits.
pub const MTU_SIZE_BITS: u32 = (MTU_SIZE_BYTES * 8) as u32;
