use std::{
    collections::{HashMap, HashSet},
    time::{Duration, Instant},
};

use wraith_shared::{GhostIndex, NetId, PacketIndex, ReplicationError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GhostStatus {
    /// Bound, but no packet carrying a full record has been acknowledged yet.
    /// Every record sent in this state is a full one.
    Spawning { in_flight: HashSet<PacketIndex> },
    Active,
    /// Left scope. The index stays reserved until a tombstone is acknowledged.
    Exiting {
        in_flight: HashSet<PacketIndex>,
        needs_send: bool,
    },
}

#[derive(Clone, Debug)]
pub struct GhostSlot {
    pub net_id: NetId,
    pub status: GhostStatus,
}

/// Binds one viewer's in-scope entities to small ghost indices.
pub struct GhostTable {
    max_ghosts: u16,
    slots: Vec<Option<GhostSlot>>,
    by_entity: HashMap<NetId, GhostIndex>,
    lifecycle_packets: HashMap<PacketIndex, (Instant, Vec<GhostIndex>)>,
}

impl GhostTable {
    pub fn new(max_ghosts: u16) -> Self {
        Self {
            max_ghosts,
            slots: Vec::new(),
            by_entity: HashMap::new(),
            lifecycle_packets: HashMap::new(),
        }
    }

    /// Binds `net_id` to the lowest free index.
    pub fn allocate(&mut self, net_id: NetId) -> Result<GhostIndex, ReplicationError> {
        if let Some(ghost) = self.by_entity.get(&net_id) {
            return Ok(*ghost);
        }

        let position = match self.slots.iter().position(Option::is_none) {
            Some(position) => position,
            None if self.slots.len() < usize::from(self.max_ghosts) => {
                self.slots.push(None);
                self.slots.len() - 1
            }
            None => {
                return Err(ReplicationError::GhostTableFull {
                    max_ghosts: self.max_ghosts,
                })
            }
        };

        let ghost = GhostIndex::new(position as u16);
        self.slots[position] = Some(GhostSlot {
            net_id,
            status: GhostStatus::Spawning {
                in_flight: HashSet::new(),
            },
        });
        self.by_entity.insert(net_id, ghost);
        Ok(ghost)
    }

    pub fn ghost_of(&self, net_id: &NetId) -> Option<GhostIndex> {
        self.by_entity.get(net_id).copied()
    }

    pub fn slot(&self, ghost: GhostIndex) -> Option<&GhostSlot> {
        self.slots
            .get(usize::from(ghost.value()))
            .and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, ghost: GhostIndex) -> Option<&mut GhostSlot> {
        self.slots
            .get_mut(usize::from(ghost.value()))
            .and_then(Option::as_mut)
    }

    pub fn is_spawning(&self, ghost: GhostIndex) -> bool {
        matches!(
            self.slot(ghost).map(|slot| &slot.status),
            Some(GhostStatus::Spawning { .. })
        )
    }

    /// Unbinds `net_id` and queues a tombstone for its ghost. The entity can
    /// be bound again right away, under a different index.
    pub fn begin_exit(&mut self, net_id: &NetId) -> Option<GhostIndex> {
        let ghost = self.by_entity.remove(net_id)?;
        if let Some(slot) = self.slot_mut(ghost) {
            slot.status = GhostStatus::Exiting {
                in_flight: HashSet::new(),
                needs_send: true,
            };
        }
        Some(ghost)
    }

    /// Ghosts whose tombstone has to be (re)written
    pub fn pending_tombstones(&self) -> Vec<(NetId, GhostIndex)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Some(GhostSlot {
                    net_id,
                    status: GhostStatus::Exiting {
                        needs_send: true, ..
                    },
                }) => Some((*net_id, GhostIndex::new(index as u16))),
                _ => None,
            })
            .collect()
    }

    fn track_packet(&mut self, now: Instant, packet_index: PacketIndex, ghost: GhostIndex) {
        let (_, ghosts) = self
            .lifecycle_packets
            .entry(packet_index)
            .or_insert_with(|| (now, Vec::new()));
        ghosts.push(ghost);
    }

    pub fn record_full_sent(&mut self, now: Instant, ghost: GhostIndex, packet_index: PacketIndex) {
        if let Some(GhostSlot {
            status: GhostStatus::Spawning { in_flight },
            ..
        }) = self.slot_mut(ghost)
        {
            in_flight.insert(packet_index);
            self.track_packet(now, packet_index, ghost);
        }
    }

    pub fn record_tombstone_sent(
        &mut self,
        now: Instant,
        ghost: GhostIndex,
        packet_index: PacketIndex,
    ) {
        if let Some(GhostSlot {
            status:
                GhostStatus::Exiting {
                    in_flight,
                    needs_send,
                },
            ..
        }) = self.slot_mut(ghost)
        {
            in_flight.insert(packet_index);
            *needs_send = false;
            self.track_packet(now, packet_index, ghost);
        }
    }

    /// Settles spawns and tombstones carried by `packet_index`. Returns the
    /// indices that became free.
    pub fn on_ack(&mut self, packet_index: PacketIndex) -> Vec<GhostIndex> {
        let mut freed = Vec::new();
        let Some((_, ghosts)) = self.lifecycle_packets.remove(&packet_index) else {
            return freed;
        };
        for ghost in ghosts {
            let settled_exit = match self.slot(ghost).map(|slot| &slot.status) {
                Some(GhostStatus::Spawning { in_flight }) if in_flight.contains(&packet_index) => {
                    false
                }
                Some(GhostStatus::Exiting { in_flight, .. })
                    if in_flight.contains(&packet_index) =>
                {
                    true
                }
                _ => continue,
            };
            if settled_exit {
                self.slots[usize::from(ghost.value())] = None;
                freed.push(ghost);
            } else if let Some(slot) = self.slot_mut(ghost) {
                slot.status = GhostStatus::Active;
            }
        }
        freed
    }

    pub fn on_nack(&mut self, packet_index: PacketIndex) {
        let Some((_, ghosts)) = self.lifecycle_packets.remove(&packet_index) else {
            return;
        };
        for ghost in ghosts {
            let Some(slot) = self.slot_mut(ghost) else {
                continue;
            };
            match &mut slot.status {
                GhostStatus::Spawning { in_flight } => {
                    in_flight.remove(&packet_index);
                }
                GhostStatus::Exiting {
                    in_flight,
                    needs_send,
                } => {
                    if in_flight.remove(&packet_index) && in_flight.is_empty() {
                        *needs_send = true;
                    }
                }
                GhostStatus::Active => {}
            }
        }
    }

    /// Treats lifecycle packets older than `window` as lost and returns them
    pub fn handle_timeouts(&mut self, now: Instant, window: Duration) -> Vec<PacketIndex> {
        let mut expired: Vec<(Instant, PacketIndex)> = self
            .lifecycle_packets
            .iter()
            .filter(|(_, (sent_at, _))| now.saturating_duration_since(*sent_at) > window)
            .map(|(packet_index, (sent_at, _))| (*sent_at, *packet_index))
            .collect();
        expired.sort();

        let expired: Vec<PacketIndex> = expired.into_iter().map(|(_, index)| index).collect();
        for packet_index in &expired {
            self.on_nack(*packet_index);
        }
        expired
    }

    /// Indices currently bound or reserved
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
