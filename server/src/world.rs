use std::collections::HashMap;

use wraith_shared::{NetId, Replica};

use crate::user::ViewerKey;

/// An authoritative object and who, if anyone, drives it with moves.
pub struct ServerEntity {
    pub replica: Replica,
    pub(crate) controller: Option<ViewerKey>,
}

impl ServerEntity {
    pub fn controller(&self) -> Option<ViewerKey> {
        self.controller
    }
}

/// Every live entity of the authority, keyed by network id.
#[derive(Default)]
pub struct EntityStore {
    entities: HashMap<NetId, ServerEntity>,
    next_net_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, replica: Replica) -> NetId {
        let net_id = NetId::new(self.next_net_id);
        self.next_net_id = self.next_net_id.wrapping_add(1);
        self.entities.insert(
            net_id,
            ServerEntity {
                replica,
                controller: None,
            },
        );
        net_id
    }

    pub(crate) fn remove(&mut self, net_id: &NetId) -> Option<ServerEntity> {
        self.entities.remove(net_id)
    }

    pub fn get(&self, net_id: &NetId) -> Option<&ServerEntity> {
        self.entities.get(net_id)
    }

    pub(crate) fn get_mut(&mut self, net_id: &NetId) -> Option<&mut ServerEntity> {
        self.entities.get_mut(net_id)
    }

    pub fn replica(&self, net_id: &NetId) -> Option<&Replica> {
        self.entities.get(net_id).map(|entity| &entity.replica)
    }

    pub fn contains(&self, net_id: &NetId) -> bool {
        self.entities.contains_key(net_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NetId, &ServerEntity)> {
        self.entities.iter()
    }

    /// Network ids in ascending order
    pub fn net_ids(&self) -> Vec<NetId> {
        let mut ids: Vec<NetId> = self.entities.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
