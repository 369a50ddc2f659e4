use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use glam::Vec2;
use log::{debug, trace, warn};

use wraith_shared::{
    write_tombstone, write_update, BitWrite, BitWriter, ChangeMask, DiffMask, GhostIndex,
    GlobalDiffHandler, MoveSequence, NetId, PacketHeader, PacketIndex, Protocol, Replica, Serde,
    Tick,
};

use crate::{
    connection::ghost_table::GhostTable,
    scheduler::{Candidate, PriorityScheduler, Tier},
    server_config::ServerConfig,
    user::ViewerKey,
    world::EntityStore,
};

enum PlannedRecord<'w> {
    Tombstone {
        ghost: GhostIndex,
    },
    Update {
        ghost: GhostIndex,
        replica: &'w Replica,
        full: bool,
        groups: DiffMask,
    },
}

impl PlannedRecord<'_> {
    fn write(&self, writer: &mut dyn BitWrite, protocol: &Protocol) {
        match self {
            PlannedRecord::Tombstone { ghost } => write_tombstone(writer, protocol, *ghost),
            PlannedRecord::Update {
                ghost,
                replica,
                full,
                groups,
            } => write_update(writer, protocol, *ghost, replica, *full, groups),
        }
    }
}

/// Replication state of one viewer: its scope, ghost table, dirty tracking
/// and scheduler. Owned exclusively by the server.
pub struct Connection {
    viewer: ViewerKey,
    ghosts: GhostTable,
    change_mask: ChangeMask,
    scheduler: PriorityScheduler,
    scope: HashSet<NetId>,
    control: Option<NetId>,
    focus: Vec2,
    last_processed_move: Option<MoveSequence>,
    next_packet_index: PacketIndex,
}

impl Connection {
    pub fn new(viewer: ViewerKey, config: &ServerConfig) -> Self {
        Self {
            viewer,
            ghosts: GhostTable::new(config.protocol.max_ghosts),
            change_mask: ChangeMask::new(),
            scheduler: PriorityScheduler::new(&config.scheduler),
            scope: HashSet::new(),
            control: None,
            focus: Vec2::ZERO,
            last_processed_move: None,
            next_packet_index: 0,
        }
    }

    pub fn viewer(&self) -> ViewerKey {
        self.viewer
    }

    // Scope

    /// Brings the viewer's scope in line with `desired`. Entities entering
    /// get a ghost index and are fully dirty; entities leaving get a
    /// tombstone. The controlled entity never leaves.
    pub fn update_scope(&mut self, mut desired: HashSet<NetId>, diff_handler: &mut GlobalDiffHandler) {
        if let Some(control) = self.control {
            desired.insert(control);
        }

        let mut leaving: Vec<NetId> = self.scope.difference(&desired).copied().collect();
        leaving.sort();
        for net_id in leaving {
            self.exit_scope(&net_id);
        }

        let mut entering: Vec<NetId> = desired.difference(&self.scope).copied().collect();
        let control = self.control;
        entering.sort_by_key(|net_id| (Some(*net_id) != control, *net_id));
        for net_id in entering {
            if !diff_handler.has_entity(&net_id) {
                continue;
            }
            let ghost = match self.ghosts.allocate(net_id) {
                Ok(ghost) => ghost,
                Err(error) => {
                    warn!("{}: {}", self.viewer, error);
                    break;
                }
            };
            let Some(receiver) = diff_handler.receiver(&net_id) else {
                continue;
            };
            debug!("{}: {} enters scope as {}", self.viewer, net_id, ghost);
            self.change_mask.register(net_id, receiver);
            self.scope.insert(net_id);
        }
    }

    fn exit_scope(&mut self, net_id: &NetId) {
        if !self.scope.remove(net_id) {
            return;
        }
        self.change_mask.deregister(net_id);
        self.scheduler.forget(net_id);
        if let Some(ghost) = self.ghosts.begin_exit(net_id) {
            debug!("{}: {} leaves scope, tombstone for {}", self.viewer, net_id, ghost);
        }
    }

    pub fn entity_destroyed(&mut self, net_id: &NetId) {
        self.exit_scope(net_id);
        if self.control == Some(*net_id) {
            self.set_control(None);
        }
    }

    pub fn in_scope(&self, net_id: &NetId) -> bool {
        self.scope.contains(net_id)
    }

    pub fn scope_len(&self) -> usize {
        self.scope.len()
    }

    pub fn ghost_of(&self, net_id: &NetId) -> Option<GhostIndex> {
        self.ghosts.ghost_of(net_id)
    }

    /// Ghost indices bound or awaiting a tombstone acknowledgement
    pub fn ghost_count(&self) -> usize {
        self.ghosts.len()
    }

    pub fn is_dirty(&self, net_id: &NetId, group: u8) -> bool {
        self.change_mask.is_dirty(net_id, group)
    }

    pub fn staleness(&self, net_id: &NetId) -> u32 {
        self.scheduler.staleness(net_id)
    }

    // Control

    pub fn control(&self) -> Option<NetId> {
        self.control
    }

    pub(crate) fn set_control(&mut self, control: Option<NetId>) {
        if self.control != control {
            self.last_processed_move = None;
        }
        self.control = control;
    }

    pub fn last_processed_move(&self) -> Option<MoveSequence> {
        self.last_processed_move
    }

    pub(crate) fn set_last_processed_move(&mut self, sequence: MoveSequence) {
        self.last_processed_move = Some(sequence);
    }

    pub fn focus(&self) -> Vec2 {
        self.focus
    }

    pub(crate) fn set_focus(&mut self, focus: Vec2) {
        self.focus = focus;
    }

    /// Where distance penalties are measured from: the controlled entity if
    /// there is one, otherwise the focus point
    pub fn origin(&self, entities: &EntityStore) -> Vec2 {
        self.control
            .and_then(|net_id| entities.replica(&net_id))
            .map(Replica::position)
            .unwrap_or(self.focus)
    }

    // Outgoing

    /// Builds this tick's packet for the viewer. A packet is always produced,
    /// even when nothing is pending, so the header keeps flowing.
    pub fn write_packet(
        &mut self,
        now: Instant,
        tick: Tick,
        entities: &EntityStore,
        config: &ServerConfig,
    ) -> (PacketIndex, Vec<u8>) {
        let packet_index = self.next_packet_index;
        self.next_packet_index = self.next_packet_index.wrapping_add(1);

        self.handle_timeouts(now, config.retransmit_window);

        let mut plans = self.plan_records(entities);
        plans.sort_by(|a, b| PriorityScheduler::compare(&a.0, &b.0));

        let protocol = &config.protocol;
        let mut writer = BitWriter::with_max_bits(config.packet_bit_budget());
        let control_ghost = self.control.and_then(|net_id| self.ghosts.ghost_of(&net_id));
        PacketHeader {
            packet_index,
            tick,
            control: control_ghost,
            last_processed_move: control_ghost.and(self.last_processed_move),
        }
        .write(&mut writer, protocol);

        // the terminating continue bit must always fit
        writer.reserve_bits(1);

        let max_skips = self.scheduler.max_consecutive_skips();
        let mut consecutive_skips = 0;
        let mut has_written = false;
        let mut stopped_at = plans.len();

        for (position, (candidate, plan)) in plans.iter().enumerate() {
            let mut counter = writer.counter();
            true.ser(&mut counter);
            plan.write(&mut counter, protocol);

            if counter.overflowed() {
                if !has_written && consecutive_skips == 0 {
                    warn!(
                        "{}: record for {} needs {} bits, only {} free in packet {}",
                        self.viewer,
                        candidate.net_id,
                        counter.bits_needed(),
                        writer.bits_free(),
                        packet_index
                    );
                }
                self.scheduler.mark_skipped(candidate);
                consecutive_skips += 1;
                if consecutive_skips >= max_skips {
                    stopped_at = position + 1;
                    break;
                }
                continue;
            }

            true.ser(&mut writer);
            plan.write(&mut writer, protocol);
            self.record_sent(now, packet_index, candidate, plan);
            self.scheduler.mark_sent(candidate);
            consecutive_skips = 0;
            has_written = true;
        }

        for (candidate, _) in &plans[stopped_at..] {
            self.scheduler.mark_skipped(candidate);
        }

        writer.release_bits(1);
        false.ser(&mut writer);

        (packet_index, writer.to_bytes())
    }

    fn plan_records<'w>(&self, entities: &'w EntityStore) -> Vec<(Candidate, PlannedRecord<'w>)> {
        let mut plans = Vec::new();

        for (net_id, ghost) in self.ghosts.pending_tombstones() {
            plans.push((
                self.scheduler.tombstone(net_id, ghost),
                PlannedRecord::Tombstone { ghost },
            ));
        }

        let origin = self.origin(entities);
        for net_id in &self.scope {
            if !self.change_mask.has_pending(net_id) {
                continue;
            }
            let (Some(replica), Some(ghost)) =
                (entities.replica(net_id), self.ghosts.ghost_of(net_id))
            else {
                continue;
            };
            let full = self.ghosts.is_spawning(ghost);
            let tier = if self.control == Some(*net_id) {
                Tier::Control
            } else if full {
                Tier::Lifecycle
            } else {
                Tier::Normal
            };
            let distance = replica.position().distance(origin);
            plans.push((
                self.scheduler
                    .candidate(*net_id, tier, replica.kind(), distance),
                PlannedRecord::Update {
                    ghost,
                    replica,
                    full,
                    groups: self.change_mask.pending(net_id),
                },
            ));
        }

        plans
    }

    fn record_sent(
        &mut self,
        now: Instant,
        packet_index: PacketIndex,
        candidate: &Candidate,
        plan: &PlannedRecord,
    ) {
        match plan {
            PlannedRecord::Tombstone { ghost } => {
                self.ghosts.record_tombstone_sent(now, *ghost, packet_index);
            }
            PlannedRecord::Update {
                ghost,
                replica,
                full,
                groups,
            } => {
                let carried = if *full {
                    self.ghosts.record_full_sent(now, *ghost, packet_index);
                    DiffMask::full(replica.group_count())
                } else {
                    *groups
                };
                self.change_mask
                    .record_transmission(now, packet_index, &candidate.net_id, carried);
            }
        }
    }

    // Delivery notifications

    pub fn on_packet_acked(&mut self, packet_index: PacketIndex) {
        self.change_mask.on_ack(packet_index);
        for ghost in self.ghosts.on_ack(packet_index) {
            trace!("{}: {} is free again", self.viewer, ghost);
            self.scheduler.forget_tombstone(&ghost);
        }
    }

    pub fn on_packet_lost(&mut self, packet_index: PacketIndex) {
        self.change_mask.on_nack(packet_index);
        self.ghosts.on_nack(packet_index);
    }

    fn handle_timeouts(&mut self, now: Instant, window: Duration) {
        for packet_index in self.change_mask.handle_timeouts(now, window) {
            debug!("{}: updates in packet {} timed out", self.viewer, packet_index);
        }
        for packet_index in self.ghosts.handle_timeouts(now, window) {
            debug!("{}: spawns or tombstones in packet {} timed out", self.viewer, packet_index);
        }
    }
}
