use std::{
    collections::{HashMap, HashSet},
    time::{Duration, Instant},
};

use glam::Vec2;
use log::{debug, info, warn};

use wraith_shared::{
    sequence_greater_than, simulate_move, GlobalDiffHandler, GroupName, MovePacket, NetId,
    PacketIndex, Replica, ReplicationError, ShipGroup, ShipState, Tick, TriggerFlags,
};

use crate::{
    connection::connection::Connection, interest::InterestQuery, server_config::ServerConfig,
    user::ViewerKey, world::EntityStore,
};

/// The authoritative world and one replication [`Connection`] per viewer.
pub struct ReplicationServer {
    config: ServerConfig,
    entities: EntityStore,
    diff_handler: GlobalDiffHandler,
    connections: HashMap<ViewerKey, Connection>,
    next_viewer: u64,
    tick: Tick,
}

impl ReplicationServer {
    pub fn new(config: ServerConfig) -> Self {
        if config.bit_budget < config.min_bit_budget() {
            warn!(
                "bit budget of {} can't fit a packet header, using {}",
                config.bit_budget,
                config.min_bit_budget()
            );
        }
        Self {
            config,
            entities: EntityStore::new(),
            diff_handler: GlobalDiffHandler::new(),
            connections: HashMap::new(),
            next_viewer: 0,
            tick: 0,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    // Entities

    /// Creates an entity and assigns its network id
    pub fn spawn_entity<R: Into<Replica>>(&mut self, replica: R) -> NetId {
        let replica = replica.into();
        let group_count = replica.group_count();
        let kind = replica.kind();
        let net_id = self.entities.insert(replica);
        self.diff_handler.register_entity(net_id, group_count);
        debug!("spawned {} {}", kind.name(), net_id);
        net_id
    }

    /// Destroys an entity. Every viewer that had it in scope receives a
    /// tombstone.
    pub fn despawn_entity(&mut self, net_id: &NetId) -> Result<(), ReplicationError> {
        if self.entities.remove(net_id).is_none() {
            return Err(ReplicationError::UnknownEntity {
                net_id: net_id.value(),
            });
        }
        self.diff_handler.deregister_entity(net_id);
        for connection in self.connections.values_mut() {
            connection.entity_destroyed(net_id);
        }
        debug!("despawned {}", net_id);
        Ok(())
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn entity(&self, net_id: &NetId) -> Option<&Replica> {
        self.entities.replica(net_id)
    }

    /// Mutable access to an entity's state. Changes are only replicated for
    /// groups raised with [`ReplicationServer::set_dirty`].
    pub fn entity_mut(&mut self, net_id: &NetId) -> Option<&mut Replica> {
        self.entities
            .get_mut(net_id)
            .map(|entity| &mut entity.replica)
    }

    /// Marks one field group of an entity changed for every viewer
    pub fn set_dirty<G: GroupName>(&mut self, net_id: &NetId, group: G) -> Result<(), ReplicationError> {
        let Some(replica) = self.entities.replica(net_id) else {
            return Err(ReplicationError::UnknownEntity {
                net_id: net_id.value(),
            });
        };
        if replica.kind() != G::KIND {
            return Err(ReplicationError::GroupKindMismatch {
                net_id: net_id.value(),
                group: group.name(),
                group_kind: G::KIND.name(),
                entity_kind: replica.kind().name(),
            });
        }
        self.diff_handler.set_dirty(net_id, group.index());
        Ok(())
    }

    /// Moves a ship without travel. Receivers snap to the new position
    /// instead of blending.
    pub fn teleport(&mut self, net_id: &NetId, position: Vec2) -> Result<(), ReplicationError> {
        let ship = self.ship_mut(net_id)?;
        ship.teleport(position);
        info!("teleported {} to {}", net_id, position);
        self.set_dirty(net_id, ShipGroup::Motion)
    }

    fn ship_mut(&mut self, net_id: &NetId) -> Result<&mut ShipState, ReplicationError> {
        let Some(entity) = self.entities.get_mut(net_id) else {
            return Err(ReplicationError::UnknownEntity {
                net_id: net_id.value(),
            });
        };
        let kind = entity.replica.kind();
        entity
            .replica
            .as_ship_mut()
            .ok_or(ReplicationError::NotControllable {
                net_id: net_id.value(),
                kind: kind.name(),
            })
    }

    // Viewers

    pub fn connect_viewer(&mut self) -> ViewerKey {
        let viewer = ViewerKey::new(self.next_viewer);
        self.next_viewer += 1;
        self.connections
            .insert(viewer, Connection::new(viewer, &self.config));
        info!("{} connected", viewer);
        viewer
    }

    /// Drops the viewer's connection. Later acknowledgements addressed to it
    /// are ignored, and entities it controlled go back to simulating on their
    /// own.
    pub fn disconnect_viewer(&mut self, viewer: &ViewerKey) -> Result<(), ReplicationError> {
        let Some(connection) = self.connections.remove(viewer) else {
            return Err(ReplicationError::UnknownViewer {
                viewer: viewer.to_u64(),
            });
        };
        if let Some(net_id) = connection.control() {
            if let Some(entity) = self.entities.get_mut(&net_id) {
                entity.controller = None;
            }
        }
        info!("{} disconnected", viewer);
        Ok(())
    }

    pub fn viewer_exists(&self, viewer: &ViewerKey) -> bool {
        self.connections.contains_key(viewer)
    }

    pub fn viewers_count(&self) -> usize {
        self.connections.len()
    }

    pub fn connection(&self, viewer: &ViewerKey) -> Option<&Connection> {
        self.connections.get(viewer)
    }

    /// Hands a ship to a viewer, or takes control away with `None`. The
    /// controlled ship is always in the viewer's scope and sent first.
    pub fn set_control(
        &mut self,
        viewer: &ViewerKey,
        net_id: Option<NetId>,
    ) -> Result<(), ReplicationError> {
        if !self.connections.contains_key(viewer) {
            return Err(ReplicationError::UnknownViewer {
                viewer: viewer.to_u64(),
            });
        }
        if let Some(net_id) = net_id {
            let ship = self.ship_mut(&net_id)?;
            ship.boosting = false;
        }

        let previous = self.connections.get(viewer).and_then(Connection::control);
        if let Some(previous) = previous {
            if let Some(entity) = self.entities.get_mut(&previous) {
                entity.controller = None;
            }
        }
        if let Some(net_id) = net_id {
            let Some(entity) = self.entities.get_mut(&net_id) else {
                return Err(ReplicationError::UnknownEntity {
                    net_id: net_id.value(),
                });
            };
            // a ship has at most one controller
            if let Some(other) = entity.controller.replace(*viewer) {
                if other != *viewer {
                    if let Some(connection) = self.connections.get_mut(&other) {
                        connection.set_control(None);
                    }
                }
            }
        }
        if let Some(connection) = self.connections.get_mut(viewer) {
            connection.set_control(net_id);
        }
        Ok(())
    }

    /// Sets the point a viewer without a controlled entity watches from
    pub fn set_viewer_focus(&mut self, viewer: &ViewerKey, focus: Vec2) -> Result<(), ReplicationError> {
        let Some(connection) = self.connections.get_mut(viewer) else {
            return Err(ReplicationError::UnknownViewer {
                viewer: viewer.to_u64(),
            });
        };
        connection.set_focus(focus);
        Ok(())
    }

    // Incoming

    /// Applies a viewer's move packet to its controlled ship. Moves at or
    /// before the last processed sequence are repeats and are skipped.
    /// Returns how many moves were simulated.
    pub fn receive_moves(&mut self, viewer: &ViewerKey, bytes: &[u8]) -> Result<usize, ReplicationError> {
        let Some(connection) = self.connections.get_mut(viewer) else {
            return Err(ReplicationError::UnknownViewer {
                viewer: viewer.to_u64(),
            });
        };
        let packet = MovePacket::from_bytes(bytes).map_err(|source| {
            warn!("{}: cannot read move packet: {}", viewer, source);
            ReplicationError::CodecMismatch {
                context: "move packet",
                source,
            }
        })?;
        let Some(net_id) = connection.control() else {
            debug!("{}: moves received without a controlled entity", viewer);
            return Ok(0);
        };
        let Some(ship) = self
            .entities
            .get_mut(&net_id)
            .and_then(|entity| entity.replica.as_ship_mut())
        else {
            return Ok(0);
        };

        let mut applied = 0;
        let mut last_processed = connection.last_processed_move();
        let mut boosting = ship.boosting;
        for next_move in &packet.moves {
            if let Some(last) = last_processed {
                if !sequence_greater_than(next_move.sequence, last) {
                    continue;
                }
            }
            simulate_move(&mut ship.motion, next_move, &self.config.dynamics);
            boosting = next_move.triggers.contains(TriggerFlags::BOOST);
            last_processed = Some(next_move.sequence);
            applied += 1;
        }

        if applied == 0 {
            return Ok(0);
        }
        let status_changed = ship.boosting != boosting;
        ship.boosting = boosting;
        if let Some(sequence) = last_processed {
            connection.set_last_processed_move(sequence);
        }

        self.diff_handler.set_dirty(&net_id, ShipGroup::Motion.index());
        if status_changed {
            self.diff_handler.set_dirty(&net_id, ShipGroup::Status.index());
        }
        Ok(applied)
    }

    // Simulation

    /// Advances every entity nobody controls by one tick of `elapsed` and
    /// raises the dirty bits the simulation reports.
    pub fn tick(&mut self, elapsed: Duration) {
        self.tick = self.tick.wrapping_add(1);
        let seconds = elapsed.as_secs_f32();

        for net_id in self.entities.net_ids() {
            let Some(entity) = self.entities.get_mut(&net_id) else {
                continue;
            };
            if entity.controller.is_some() {
                continue;
            }
            let changed = entity.replica.simulate(seconds, &self.config.dynamics);
            for group in changed.iter() {
                self.diff_handler.set_dirty(&net_id, group);
            }
        }
    }

    // Outgoing

    /// Updates every viewer's scope from `interest` and writes one packet per
    /// viewer. If you don't call this method, viewers never hear from the
    /// server.
    pub fn send_all_packets(
        &mut self,
        now: Instant,
        interest: &dyn InterestQuery,
    ) -> Vec<(ViewerKey, PacketIndex, Vec<u8>)> {
        let mut viewers: Vec<ViewerKey> = self.connections.keys().copied().collect();
        viewers.sort();

        // shuffle order of connections in order to avoid priority among viewers
        fastrand::shuffle(&mut viewers);

        let mut packets = Vec::with_capacity(viewers.len());
        for viewer in viewers {
            let Some(connection) = self.connections.get_mut(&viewer) else {
                continue;
            };
            let desired: HashSet<NetId> =
                interest.candidates(viewer, connection.origin(&self.entities), &self.entities);
            connection.update_scope(desired, &mut self.diff_handler);
            let (packet_index, bytes) =
                connection.write_packet(now, self.tick, &self.entities, &self.config);
            packets.push((viewer, packet_index, bytes));
        }
        packets
    }

    /// The transport confirmed delivery of a packet to `viewer`
    pub fn on_packet_acked(&mut self, viewer: &ViewerKey, packet_index: PacketIndex) {
        match self.connections.get_mut(viewer) {
            Some(connection) => connection.on_packet_acked(packet_index),
            None => debug!("ack for {} from disconnected {}", packet_index, viewer),
        }
    }

    /// The transport reported a packet to `viewer` lost
    pub fn on_packet_lost(&mut self, viewer: &ViewerKey, packet_index: PacketIndex) {
        match self.connections.get_mut(viewer) {
            Some(connection) => connection.on_packet_lost(packet_index),
            None => debug!("loss of {} for disconnected {}", packet_index, viewer),
        }
    }
}
