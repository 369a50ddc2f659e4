use crate::SerdeErr;

/// Reads bits back out of a buffer produced by [`crate::BitWriter`].
pub struct BitReader<'b> {
    buffer: &'b [u8],
    bit_index: usize,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            bit_index: 0,
        }
    }

    pub fn bits_remaining(&self) -> u32 {
        (self.buffer.len() * 8 - self.bit_index) as u32
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let Some(byte) = self.buffer.get(self.bit_index / 8) else {
            return Err(SerdeErr::OutOfBits {
                requested: 1,
                remaining: 0,
            });
        };
        let bit = (byte >> (self.bit_index % 8)) & 1 != 0;
        self.bit_index += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let remaining = self.bits_remaining();
        if remaining < 8 {
            return Err(SerdeErr::OutOfBits {
                requested: 8,
                remaining,
            });
        }
        let mut output = 0u8;
        for index in 0..8 {
            if self.read_bit()? {
                output |= 1 << index;
            }
        }
        Ok(output)
    }
}
