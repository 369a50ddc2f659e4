use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use log::trace;

use crate::{
    types::{NetId, PacketIndex},
    wrapping_number::sequence_greater_than,
};

use super::{diff_mask::DiffMask, dirty_channel::DirtyReceiver};

/// Per-viewer dirty tracking.
///
/// Each entity in the viewer's scope has a pending mask fed by its
/// [`super::dirty_channel::DirtyChannel`]. Bits move from pending to an
/// in-flight record when a packet carries them, and leave the in-flight
/// record when that packet is acknowledged. A lost packet puts its bits back
/// into pending, except for bits a later packet carried again, whether that
/// packet is still in flight or already acknowledged.
pub struct ChangeMask {
    receivers: HashMap<NetId, DirtyReceiver>,
    sent_updates: HashMap<PacketIndex, SentUpdate>,
}

struct SentUpdate {
    sent_at: Instant,
    carried: HashMap<NetId, DiffMask>,
    /// Bits delivered by acknowledged packets sent after this one
    superseded: HashMap<NetId, DiffMask>,
}

impl SentUpdate {
    fn new(sent_at: Instant) -> Self {
        Self {
            sent_at,
            carried: HashMap::new(),
            superseded: HashMap::new(),
        }
    }
}

impl ChangeMask {
    pub fn new() -> Self {
        Self {
            receivers: HashMap::new(),
            sent_updates: HashMap::new(),
        }
    }

    // Registration

    pub fn register(&mut self, net_id: NetId, receiver: DirtyReceiver) {
        self.receivers.insert(net_id, receiver);
    }

    /// Stops tracking `net_id`. In-flight records for it are discarded too,
    /// so a later loss report cannot resurrect its bits.
    pub fn deregister(&mut self, net_id: &NetId) {
        self.receivers.remove(net_id);
        for update in self.sent_updates.values_mut() {
            update.carried.remove(net_id);
            update.superseded.remove(net_id);
        }
    }

    pub fn is_registered(&self, net_id: &NetId) -> bool {
        self.receivers.contains_key(net_id)
    }

    // Pending bits

    pub fn pending(&self, net_id: &NetId) -> DiffMask {
        self.receivers
            .get(net_id)
            .map(|receiver| *receiver.mask())
            .unwrap_or_default()
    }

    pub fn has_pending(&self, net_id: &NetId) -> bool {
        self.receivers
            .get(net_id)
            .is_some_and(|receiver| !receiver.is_clear())
    }

    pub fn set_pending(&mut self, net_id: &NetId, mask: &DiffMask) {
        if let Some(receiver) = self.receivers.get(net_id) {
            receiver.or_mask(mask);
        }
    }

    /// Bits that were carried by a packet still awaiting acknowledgement
    pub fn in_flight(&self, net_id: &NetId) -> DiffMask {
        let mut mask = DiffMask::new();
        for update in self.sent_updates.values() {
            if let Some(carried) = update.carried.get(net_id) {
                mask.or(carried);
            }
        }
        mask
    }

    /// Pending or in flight: the bit is not yet known to have arrived
    pub fn is_dirty(&self, net_id: &NetId, group: u8) -> bool {
        self.pending(net_id).bit(group) || self.in_flight(net_id).bit(group)
    }

    // Transmission

    /// Takes every pending bit of `net_id` into the record of `packet_index`
    /// and returns them.
    pub fn begin_transmission(
        &mut self,
        now: Instant,
        packet_index: PacketIndex,
        net_id: &NetId,
    ) -> DiffMask {
        let mask = self.pending(net_id);
        self.record_transmission(now, packet_index, net_id, mask);
        mask
    }

    /// Records that `packet_index` carried `carried` for `net_id`. The carried
    /// bits leave pending; any other pending bits stay.
    pub fn record_transmission(
        &mut self,
        now: Instant,
        packet_index: PacketIndex,
        net_id: &NetId,
        carried: DiffMask,
    ) {
        let Some(receiver) = self.receivers.get(net_id) else {
            return;
        };
        receiver.nand_mask(&carried);

        self.sent_updates
            .entry(packet_index)
            .or_insert_with(|| SentUpdate::new(now))
            .carried
            .entry(*net_id)
            .or_default()
            .or(&carried);
    }

    /// Drops the record of `packet_index`. Older packets still in flight
    /// remember what it delivered, so losing them later requeues nothing the
    /// viewer already has.
    pub fn on_ack(&mut self, packet_index: PacketIndex) {
        let Some(acked) = self.sent_updates.remove(&packet_index) else {
            return;
        };
        for (older_index, older) in self.sent_updates.iter_mut() {
            if !sequence_greater_than(packet_index, *older_index) {
                continue;
            }
            for (net_id, carried) in &acked.carried {
                if older.carried.contains_key(net_id) {
                    older.superseded.entry(*net_id).or_default().or(carried);
                }
            }
        }
    }

    pub fn on_nack(&mut self, dropped_packet_index: PacketIndex) {
        let Some(dropped) = self.sent_updates.remove(&dropped_packet_index) else {
            return;
        };
        for (net_id, carried) in dropped.carried {
            let Some(receiver) = self.receivers.get(&net_id) else {
                continue;
            };
            let mut requeue = carried;
            if let Some(delivered) = dropped.superseded.get(&net_id) {
                requeue.nand(delivered);
            }

            // bits a later packet carried again are covered by that packet
            for (packet_index, later) in &self.sent_updates {
                if !sequence_greater_than(*packet_index, dropped_packet_index) {
                    continue;
                }
                if let Some(later) = later.carried.get(&net_id) {
                    requeue.nand(later);
                }
            }

            if !requeue.is_clear() {
                trace!("ChangeMask: packet {dropped_packet_index} lost, requeue {net_id} {requeue:?}");
                receiver.or_mask(&requeue);
            }
        }
    }

    /// Treats packets older than `window` as lost. Returns the indices that
    /// timed out, oldest first.
    pub fn handle_timeouts(&mut self, now: Instant, window: Duration) -> Vec<PacketIndex> {
        let mut expired: Vec<(Instant, PacketIndex)> = self
            .sent_updates
            .iter()
            .filter(|(_, update)| now.saturating_duration_since(update.sent_at) > window)
            .map(|(packet_index, update)| (update.sent_at, *packet_index))
            .collect();
        expired.sort();

        let expired: Vec<PacketIndex> = expired.into_iter().map(|(_, index)| index).collect();
        for packet_index in &expired {
            self.on_nack(*packet_index);
        }
        expired
    }

    pub fn packets_in_flight(&self) -> usize {
        self.sent_updates.len()
    }
}

impl Default for ChangeMask {
    fn default() -> Self {
        Self::new()
    }
}
