use crate::{bit_counter::BitCounter, constants::MTU_SIZE_BITS};

pub trait BitWrite {
    fn write_bit(&mut self, bit: bool);
    fn write_byte(&mut self, byte: u8);
    fn count_bits(&mut self, bits: u32);
    fn is_counter(&self) -> bool;
}

/// Writes bits into a buffer capped at a fixed bit budget.
///
/// Bits are packed least-significant first within each byte. The budget can be
/// temporarily shrunk with [`BitWriter::reserve_bits`] so that a terminating
/// bit is always guaranteed to fit.
pub struct BitWriter {
    scratch: u8,
    scratch_index: u8,
    buffer: Vec<u8>,
    current_bits: u32,
    max_bits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_max_bits(MTU_SIZE_BITS)
    }

    pub fn with_max_bits(max_bits: u32) -> Self {
        Self {
            scratch: 0,
            scratch_index: 0,
            buffer: Vec::with_capacity(max_bits.div_ceil(8) as usize),
            current_bits: 0,
            max_bits,
        }
    }

    fn flush_scratch(&mut self) {
        if self.scratch_index > 0 {
            let byte = (self.scratch << (8 - self.scratch_index)).reverse_bits();
            self.buffer.push(byte);
            self.scratch = 0;
            self.scratch_index = 0;
        }
    }

    pub fn to_bytes(mut self) -> Vec<u8> {
        self.flush_scratch();
        self.buffer
    }

    /// Returns a counter that measures how many bits a write would take,
    /// starting from this writer's current position and budget.
    pub fn counter(&self) -> BitCounter {
        BitCounter::new(self.current_bits, self.max_bits)
    }

    pub fn reserve_bits(&mut self, bits: u32) {
        self.max_bits = self.max_bits.saturating_sub(bits);
    }

    pub fn release_bits(&mut self, bits: u32) {
        self.max_bits += bits;
    }

    pub fn bits_written(&self) -> u32 {
        self.current_bits
    }

    pub fn bits_free(&self) -> u32 {
        self.max_bits.saturating_sub(self.current_bits)
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        if self.current_bits >= self.max_bits {
            panic!(
                "Write overflow! BitWriter budget of {} bits exhausted. Measure with counter() before writing.",
                self.max_bits
            );
        }
        self.scratch <<= 1;

        if bit {
            self.scratch |= 1;
        }

        self.scratch_index += 1;
        self.current_bits += 1;

        if self.scratch_index >= 8 {
            self.buffer.push(self.scratch.reverse_bits());
            self.scratch_index = 0;
            self.scratch = 0;
        }
    }

    fn write_byte(&mut self, byte: u8) {
        let mut temp = byte;
        for _ in 0..8 {
            self.write_bit(temp & 1 != 0);
            temp >>= 1;
        }
    }

    fn count_bits(&mut self, _bits: u32) {
        panic!("This method should not be called for BitWriter!");
    }

    fn is_counter(&self) -> bool {
        false
    }
}
