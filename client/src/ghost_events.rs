use std::vec::IntoIter;

use wraith_shared::{GhostIndex, ObjectKind};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GhostEvent {
    Created {
        ghost: GhostIndex,
        kind: ObjectKind,
    },
    Destroyed {
        ghost: GhostIndex,
        kind: ObjectKind,
    },
    /// The authority corrected the locally predicted entity
    Corrected {
        ghost: GhostIndex,
        distance: f32,
        warped: bool,
    },
}

/// Ghost events collected since the last time they were taken, in arrival
/// order.
pub struct GhostEvents {
    events: Vec<GhostEvent>,
}

impl Default for GhostEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl GhostEvents {
    pub(crate) fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Takes only the events of kind `V`, leaving the rest in place
    pub fn read<V: GhostEventKind>(&mut self) -> IntoIter<V::Item> {
        let mut taken = Vec::new();
        self.events.retain(|event| match V::matches(event) {
            Some(item) => {
                taken.push(item);
                false
            }
            None => true,
        });
        taken.into_iter()
    }

    pub fn has<V: GhostEventKind>(&self) -> bool {
        self.events.iter().any(|event| V::matches(event).is_some())
    }

    /// Takes every event
    pub fn drain(&mut self) -> Vec<GhostEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push(&mut self, event: GhostEvent) {
        self.events.push(event);
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }
}

// Event Trait
pub trait GhostEventKind {
    type Item;

    fn matches(event: &GhostEvent) -> Option<Self::Item>;
}

// Created Event
pub struct CreatedEvent;
impl GhostEventKind for CreatedEvent {
    type Item = (GhostIndex, ObjectKind);

    fn matches(event: &GhostEvent) -> Option<Self::Item> {
        match event {
            GhostEvent::Created { ghost, kind } => Some((*ghost, *kind)),
            _ => None,
        }
    }
}

// Destroyed Event
pub struct DestroyedEvent;
impl GhostEventKind for DestroyedEvent {
    type Item = (GhostIndex, ObjectKind);

    fn matches(event: &GhostEvent) -> Option<Self::Item> {
        match event {
            GhostEvent::Destroyed { ghost, kind } => Some((*ghost, *kind)),
            _ => None,
        }
    }
}

// Corrected Event
pub struct CorrectedEvent;
impl GhostEventKind for CorrectedEvent {
    type Item = (GhostIndex, f32, bool);

    fn matches(event: &GhostEvent) -> Option<Self::Item> {
        match event {
            GhostEvent::Corrected {
                ghost,
                distance,
                warped,
            } => Some((*ghost, *distance, *warped)),
            _ => None,
        }
    }
}
