use std::collections::HashMap;

use log::{trace, warn};

use wraith_shared::{
    create_proxy, read_groups, read_record_header, sequence_greater_than, BitReader, DiffMask,
    GhostIndex, ObjectKind, PacketHeader, PacketIndex, Protocol, RecordHeader, Replica,
    ReplicationError, Serde, SerdeErr,
};

use crate::ghost_events::{GhostEvent, GhostEvents};

/// Groups applied to one ghost by a received packet
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostUpdate {
    pub ghost: GhostIndex,
    pub groups: DiffMask,
    pub created: bool,
}

/// Outcome of reading one server packet
#[derive(Clone, Debug, PartialEq)]
pub struct ReceivedPacket {
    pub header: PacketHeader,
    pub updates: Vec<GhostUpdate>,
    pub destroyed: Vec<GhostIndex>,
    /// Delta records for ghosts this client does not know
    pub dropped: Vec<ReplicationError>,
}

/// Proxies of every ghost the server has told this client about.
#[derive(Default)]
pub struct GhostReader {
    ghosts: HashMap<GhostIndex, Replica>,
    last_packet_index: Option<PacketIndex>,
}

impl GhostReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ghost(&self, ghost: &GhostIndex) -> Option<&Replica> {
        self.ghosts.get(ghost)
    }

    pub fn ghosts(&self) -> impl Iterator<Item = (&GhostIndex, &Replica)> {
        self.ghosts.iter()
    }

    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }

    pub fn last_packet_index(&self) -> Option<PacketIndex> {
        self.last_packet_index
    }

    pub fn clear(&mut self) {
        self.ghosts.clear();
        self.last_packet_index = None;
    }

    /// Reads a whole packet and applies every record to the ghost proxies.
    ///
    /// Any [`SerdeErr`] means this reader no longer agrees with the writer's
    /// layout and is returned as a fatal [`ReplicationError::CodecMismatch`].
    /// Records read before the failure stay applied.
    pub fn read_packet(
        &mut self,
        buffer: &[u8],
        protocol: &Protocol,
        events: &mut GhostEvents,
    ) -> Result<Option<ReceivedPacket>, ReplicationError> {
        let mut reader = BitReader::new(buffer);
        let header = PacketHeader::read(&mut reader, protocol).map_err(|source| {
            ReplicationError::CodecMismatch {
                context: "packet header",
                source,
            }
        })?;

        if let Some(last) = self.last_packet_index {
            if !sequence_greater_than(header.packet_index, last) {
                warn!(
                    "dropping packet {} which is not newer than {}",
                    header.packet_index, last
                );
                return Ok(None);
            }
        }
        self.last_packet_index = Some(header.packet_index);

        let mut received = ReceivedPacket {
            header,
            updates: Vec::new(),
            destroyed: Vec::new(),
            dropped: Vec::new(),
        };

        loop {
            let more = bool::de(&mut reader).map_err(|source| {
                ReplicationError::CodecMismatch {
                    context: "record continue bit",
                    source,
                }
            })?;
            if !more {
                break;
            }
            self.read_record(&mut reader, protocol, events, &mut received)
                .map_err(|source| ReplicationError::CodecMismatch {
                    context: "record",
                    source,
                })?;
        }

        Ok(Some(received))
    }

    fn read_record(
        &mut self,
        reader: &mut BitReader,
        protocol: &Protocol,
        events: &mut GhostEvents,
        received: &mut ReceivedPacket,
    ) -> Result<(), SerdeErr> {
        match read_record_header(reader, protocol)? {
            RecordHeader::Tombstone { ghost } => {
                match self.ghosts.remove(&ghost) {
                    Some(replica) => {
                        trace!("{} destroyed", ghost);
                        events.push(GhostEvent::Destroyed {
                            ghost,
                            kind: replica.kind(),
                        });
                        received.destroyed.push(ghost);
                    }
                    None => warn!("tombstone for unknown {} ignored", ghost),
                }
                Ok(())
            }
            RecordHeader::Update { ghost, kind, full } => {
                let known_kind = self.ghosts.get(&ghost).map(Replica::kind);

                match known_kind {
                    Some(existing) if existing == kind => {
                        let Some(replica) = self.ghosts.get_mut(&ghost) else {
                            return Ok(());
                        };
                        let groups = read_groups(reader, replica)?;
                        received.updates.push(GhostUpdate {
                            ghost,
                            groups,
                            created: false,
                        });
                    }
                    Some(existing) if full => {
                        // the index was rebound without this client seeing the tombstone
                        warn!(
                            "{} changed kind from {} to {}, replacing proxy",
                            ghost,
                            existing.name(),
                            kind.name()
                        );
                        self.ghosts.remove(&ghost);
                        events.push(GhostEvent::Destroyed {
                            ghost,
                            kind: existing,
                        });
                        received.destroyed.push(ghost);
                        self.spawn(reader, ghost, kind, events, received)?;
                    }
                    None if full => {
                        self.spawn(reader, ghost, kind, events, received)?;
                    }
                    _ => {
                        // still parse the record to stay in sync with the stream
                        let mut scratch = create_proxy(kind);
                        read_groups(reader, &mut scratch)?;
                        let error = ReplicationError::UnknownGhostIndex {
                            ghost: ghost.value(),
                            kind: kind.name(),
                        };
                        warn!("{}", error);
                        received.dropped.push(error);
                    }
                }
                Ok(())
            }
        }
    }

    fn spawn(
        &mut self,
        reader: &mut BitReader,
        ghost: GhostIndex,
        kind: ObjectKind,
        events: &mut GhostEvents,
        received: &mut ReceivedPacket,
    ) -> Result<(), SerdeErr> {
        let mut replica = create_proxy(kind);
        let groups = read_groups(reader, &mut replica)?;
        trace!("{} created as {}", ghost, kind.name());
        self.ghosts.insert(ghost, replica);
        events.push(GhostEvent::Created { ghost, kind });
        received.updates.push(GhostUpdate {
            ghost,
            groups,
            created: true,
        });
        Ok(())
    }
}
