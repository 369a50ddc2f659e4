use wraith_serde::{
    read_enum, read_ranged_int, write_enum, write_ranged_int, BitReader, BitWrite,
    ConstBitLength, Serde, SerdeErr,
};

use crate::{
    protocol::Protocol,
    types::{GhostIndex, MoveSequence, PacketIndex, Tick},
};

use super::{host::diff_mask::DiffMask, kind::ObjectKind, replica::Replica};

/// Prefix of every server to client packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketHeader {
    pub packet_index: PacketIndex,
    pub tick: Tick,
    /// Ghost the receiving viewer controls, if any
    pub control: Option<GhostIndex>,
    /// Newest move of that viewer the authority has simulated
    pub last_processed_move: Option<MoveSequence>,
}

impl PacketHeader {
    pub fn write(&self, writer: &mut dyn BitWrite, protocol: &Protocol) {
        self.packet_index.ser(writer);
        self.tick.ser(writer);

        self.control.is_some().ser(writer);
        if let Some(ghost) = self.control {
            write_ghost_index(writer, protocol, ghost);
        }

        self.last_processed_move.is_some().ser(writer);
        if let Some(sequence) = self.last_processed_move {
            sequence.ser(writer);
        }
    }

    /// Size of the largest header: one with both a control ghost and a last
    /// processed move
    pub fn max_bit_length(protocol: &Protocol) -> u32 {
        PacketIndex::const_bit_length()
            + Tick::const_bit_length()
            + bool::const_bit_length()
            + u32::from(protocol.ghost_index_bits())
            + bool::const_bit_length()
            + MoveSequence::const_bit_length()
    }

    pub fn read(reader: &mut BitReader, protocol: &Protocol) -> Result<Self, SerdeErr> {
        let packet_index = PacketIndex::de(reader)?;
        let tick = Tick::de(reader)?;
        let control = if bool::de(reader)? {
            Some(read_ghost_index(reader, protocol)?)
        } else {
            None
        };
        let last_processed_move = if bool::de(reader)? {
            Some(MoveSequence::de(reader)?)
        } else {
            None
        };
        Ok(Self {
            packet_index,
            tick,
            control,
            last_processed_move,
        })
    }
}

fn write_ghost_index(writer: &mut dyn BitWrite, protocol: &Protocol, ghost: GhostIndex) {
    write_ranged_int(
        writer,
        i64::from(ghost.value()),
        0,
        protocol.max_ghost_index(),
    );
}

fn read_ghost_index(reader: &mut BitReader, protocol: &Protocol) -> Result<GhostIndex, SerdeErr> {
    let value = read_ranged_int(reader, 0, protocol.max_ghost_index())?;
    Ok(GhostIndex::new(value as u16))
}

/// Writes an update record: ghost index, a cleared tombstone flag, the kind
/// tag, the full flag, then a presence flag per group followed by the group
/// payload when present. A full record carries every group.
pub fn write_update(
    writer: &mut dyn BitWrite,
    protocol: &Protocol,
    ghost: GhostIndex,
    replica: &Replica,
    full: bool,
    groups: &DiffMask,
) {
    write_ghost_index(writer, protocol, ghost);
    false.ser(writer);
    write_enum(writer, replica.kind());
    full.ser(writer);

    for group in 0..replica.group_count() {
        let present = full || groups.bit(group);
        present.ser(writer);
        if present {
            replica.write_group(group, writer);
        }
    }
}

/// Writes a tombstone record: ghost index and a set tombstone flag.
pub fn write_tombstone(writer: &mut dyn BitWrite, protocol: &Protocol, ghost: GhostIndex) {
    write_ghost_index(writer, protocol, ghost);
    true.ser(writer);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordHeader {
    Tombstone {
        ghost: GhostIndex,
    },
    Update {
        ghost: GhostIndex,
        kind: ObjectKind,
        full: bool,
    },
}

pub fn read_record_header(
    reader: &mut BitReader,
    protocol: &Protocol,
) -> Result<RecordHeader, SerdeErr> {
    let ghost = read_ghost_index(reader, protocol)?;
    if bool::de(reader)? {
        return Ok(RecordHeader::Tombstone { ghost });
    }
    let kind = read_enum(reader)?;
    let full = bool::de(reader)?;
    Ok(RecordHeader::Update { ghost, kind, full })
}

/// Applies the groups that follow an update header onto `replica`, which must
/// be of the record's kind. Returns which groups were present.
pub fn read_groups(reader: &mut BitReader, replica: &mut Replica) -> Result<DiffMask, SerdeErr> {
    let mut present = DiffMask::new();
    for group in 0..replica.group_count() {
        if bool::de(reader)? {
            replica.read_group(group, reader)?;
            present.set_bit(group, true);
        }
    }
    Ok(present)
}
