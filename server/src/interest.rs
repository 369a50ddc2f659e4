use std::collections::HashSet;

use glam::Vec2;

use wraith_shared::{NetId, ObjectKind};

use crate::{user::ViewerKey, world::EntityStore};

/// Spatial interest: which entities matter to a viewer right now.
///
/// The viewer's controlled entity is always kept in scope regardless of what
/// the query returns.
pub trait InterestQuery {
    fn candidates(&self, viewer: ViewerKey, focus: Vec2, world: &EntityStore) -> HashSet<NetId>;
}

/// Every entity is relevant to every viewer
pub struct ScopeAll;

impl InterestQuery for ScopeAll {
    fn candidates(&self, _: ViewerKey, _: Vec2, world: &EntityStore) -> HashSet<NetId> {
        world.iter().map(|(net_id, _)| *net_id).collect()
    }
}

/// Entities within `radius` of the viewer's focus. Walls are level geometry
/// and always relevant.
pub struct RadiusInterest {
    pub radius: f32,
}

impl RadiusInterest {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl InterestQuery for RadiusInterest {
    fn candidates(&self, _: ViewerKey, focus: Vec2, world: &EntityStore) -> HashSet<NetId> {
        world
            .iter()
            .filter(|(_, entity)| {
                entity.replica.kind() == ObjectKind::Wall
                    || entity.replica.position().distance(focus) <= self.radius
            })
            .map(|(net_id, _)| *net_id)
            .collect()
    }
}
