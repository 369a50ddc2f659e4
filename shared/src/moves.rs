use glam::Vec2;

use wraith_serde::{
    quantize_float, read_bits, read_quantized_float, read_ranged_int, write_bits,
    write_quantized_float, write_ranged_int, BitCounter, BitReader, BitWrite, Serde, SerdeErr,
};

use crate::{
    types::MoveSequence,
    world::control_state::{facing_to_step, snap_facing, step_to_facing, FACING_STEPS},
};

/// Longest span of simulated time a single move may cover
pub const MAX_MOVE_DURATION_MS: u16 = 1000;
/// Hard cap on moves carried by one [`MovePacket`]
pub const MAX_MOVES_IN_PACKET: usize = 32;

const THRUST_BITS: u8 = 8;
const TRIGGER_BITS: u8 = 2;

/// Buttons held for the duration of a move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TriggerFlags(u8);

impl TriggerFlags {
    pub const NONE: Self = Self(0);
    pub const FIRE: Self = Self(1);
    pub const BOOST: Self = Self(1 << 1);

    const ALL: u8 = Self::FIRE.0 | Self::BOOST.0;

    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// One timestamped snapshot of local input.
///
/// Every field is stored exactly as the wire will deliver it, so the client
/// predicts with the same values the authority later simulates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Move {
    pub sequence: MoveSequence,
    pub thrust: Vec2,
    pub triggers: TriggerFlags,
    pub facing: f32,
    pub duration_ms: u16,
}

impl Move {
    pub fn new(
        sequence: MoveSequence,
        thrust: Vec2,
        triggers: TriggerFlags,
        facing: f32,
        duration_ms: u16,
    ) -> Self {
        Self {
            sequence,
            thrust: Vec2::new(
                quantize_float(thrust.x, THRUST_BITS, 1.0),
                quantize_float(thrust.y, THRUST_BITS, 1.0),
            ),
            triggers,
            facing: snap_facing(facing),
            duration_ms: duration_ms.min(MAX_MOVE_DURATION_MS),
        }
    }

    pub fn seconds(&self) -> f32 {
        f32::from(self.duration_ms) / 1000.0
    }
}

impl Serde for Move {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.sequence.ser(writer);
        write_quantized_float(writer, self.thrust.x, THRUST_BITS, 1.0);
        write_quantized_float(writer, self.thrust.y, THRUST_BITS, 1.0);
        write_bits(writer, u64::from(self.triggers.bits()), TRIGGER_BITS);
        write_ranged_int(writer, facing_to_step(self.facing), 0, FACING_STEPS - 1);
        write_ranged_int(
            writer,
            i64::from(self.duration_ms.min(MAX_MOVE_DURATION_MS)),
            0,
            i64::from(MAX_MOVE_DURATION_MS),
        );
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let sequence = MoveSequence::de(reader)?;
        let thrust_x = read_quantized_float(reader, THRUST_BITS, 1.0)?;
        let thrust_y = read_quantized_float(reader, THRUST_BITS, 1.0)?;
        let triggers = TriggerFlags::from_bits(read_bits(reader, TRIGGER_BITS)? as u8);
        let facing = step_to_facing(read_ranged_int(reader, 0, FACING_STEPS - 1)?);
        let duration_ms = read_ranged_int(reader, 0, i64::from(MAX_MOVE_DURATION_MS))? as u16;
        Ok(Self {
            sequence,
            thrust: Vec2::new(thrust_x, thrust_y),
            triggers,
            facing,
            duration_ms,
        })
    }

    fn bit_length(&self) -> u32 {
        let mut counter = BitCounter::new(0, u32::MAX);
        self.ser(&mut counter);
        counter.bits_needed()
    }
}

/// Client to server datagram: the newest unacknowledged moves, oldest first.
///
/// Moves are repeated in every packet until the authority reports them
/// processed, so a lost uplink packet never loses input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovePacket {
    pub moves: Vec<Move>,
}

impl MovePacket {
    pub fn new(moves: Vec<Move>) -> Self {
        Self { moves }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = wraith_serde::BitWriter::with_max_bits(self.bit_length());
        self.ser(&mut writer);
        writer.to_bytes()
    }

    pub fn from_bytes(buffer: &[u8]) -> Result<Self, SerdeErr> {
        Self::de(&mut BitReader::new(buffer))
    }
}

impl Serde for MovePacket {
    fn ser(&self, writer: &mut dyn BitWrite) {
        // keep the newest moves if the caller overfilled the packet
        let skip = self.moves.len().saturating_sub(MAX_MOVES_IN_PACKET);
        let count = self.moves.len() - skip;
        write_ranged_int(writer, count as i64, 0, MAX_MOVES_IN_PACKET as i64);
        for next_move in &self.moves[skip..] {
            next_move.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let count = read_ranged_int(reader, 0, MAX_MOVES_IN_PACKET as i64)? as usize;
        let mut moves = Vec::with_capacity(count);
        for _ in 0..count {
            moves.push(Move::de(reader)?);
        }
        Ok(Self { moves })
    }

    fn bit_length(&self) -> u32 {
        let mut counter = BitCounter::new(0, u32::MAX);
        self.ser(&mut counter);
        counter.bits_needed()
    }
}
