use std::collections::HashMap;

use log::{debug, warn};

use crate::types::NetId;

use super::dirty_channel::{DirtyChannel, DirtyReceiver};

/// Owns the dirty channel of every live entity on the authority.
#[derive(Default)]
pub struct GlobalDiffHandler {
    channels: HashMap<NetId, DirtyChannel>,
}

impl GlobalDiffHandler {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }

    pub fn register_entity(&mut self, net_id: NetId, group_count: u8) {
        if self.channels.contains_key(&net_id) {
            panic!("GlobalDiffHandler: {net_id} cannot register more than once!");
        }
        debug!("GlobalDiffHandler: registering {net_id} with {group_count} groups");
        self.channels.insert(net_id, DirtyChannel::new(group_count));
    }

    pub fn deregister_entity(&mut self, net_id: &NetId) {
        self.channels.remove(net_id);
    }

    pub fn has_entity(&self, net_id: &NetId) -> bool {
        self.channels.contains_key(net_id)
    }

    /// Marks `group` changed for every viewer of `net_id`. Returns false when
    /// the entity is not registered.
    pub fn set_dirty(&mut self, net_id: &NetId, group: u8) -> bool {
        let Some(channel) = self.channels.get_mut(net_id) else {
            warn!("GlobalDiffHandler: set_dirty on unregistered {net_id}");
            return false;
        };
        if group >= channel.group_count() {
            panic!(
                "GlobalDiffHandler: group {group} out of range for {net_id} with {} groups",
                channel.group_count()
            );
        }
        channel.send(group);
        true
    }

    pub fn receiver(&mut self, net_id: &NetId) -> Option<DirtyReceiver> {
        self.channels
            .get_mut(net_id)
            .map(|channel| channel.new_receiver())
    }
}
