use std::{cmp::Ordering, collections::HashMap};

use wraith_shared::{GhostIndex, NetId, ObjectKind};

use crate::server_config::SchedulerConfig;

/// Coarse ordering applied before the score is looked at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// The viewer's own controlled entity
    Control,
    /// New ghosts and tombstones
    Lifecycle,
    Normal,
}

/// What a candidate record would write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordTarget {
    Update,
    Tombstone(GhostIndex),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub net_id: NetId,
    pub target: RecordTarget,
    pub tier: Tier,
    pub score: f32,
}

/// Ranks one viewer's pending records for a tick and remembers how long each
/// record has been waiting. Updates wait per entity, tombstones per ghost
/// index, since a re-entered entity holds a new index while its old one is
/// still being retired.
pub struct PriorityScheduler {
    config: SchedulerConfig,
    staleness: HashMap<NetId, u32>,
    tombstone_staleness: HashMap<GhostIndex, u32>,
}

impl PriorityScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            config: config.clone(),
            staleness: HashMap::new(),
            tombstone_staleness: HashMap::new(),
        }
    }

    pub fn staleness(&self, net_id: &NetId) -> u32 {
        self.staleness.get(net_id).copied().unwrap_or(0)
    }

    pub fn tombstone_staleness(&self, ghost: &GhostIndex) -> u32 {
        self.tombstone_staleness.get(ghost).copied().unwrap_or(0)
    }

    pub fn score(&self, net_id: &NetId, kind: ObjectKind, distance: f32) -> f32 {
        self.config.kind_weight(kind) - distance * self.config.distance_scale
            + self.staleness(net_id) as f32 * self.config.staleness_step
    }

    pub fn candidate(&self, net_id: NetId, tier: Tier, kind: ObjectKind, distance: f32) -> Candidate {
        Candidate {
            net_id,
            target: RecordTarget::Update,
            tier,
            score: self.score(&net_id, kind, distance),
        }
    }

    /// A tombstone for a ghost whose entity left scope. The entity may no
    /// longer exist, so only waiting time counts toward the score.
    pub fn tombstone(&self, net_id: NetId, ghost: GhostIndex) -> Candidate {
        Candidate {
            net_id,
            target: RecordTarget::Tombstone(ghost),
            tier: Tier::Lifecycle,
            score: self.tombstone_staleness(&ghost) as f32 * self.config.staleness_step,
        }
    }

    /// Sorts by tier, then score descending, then lower id first.
    pub fn rank(&self, candidates: &mut [Candidate]) {
        candidates.sort_by(Self::compare);
    }

    pub fn compare(a: &Candidate, b: &Candidate) -> Ordering {
        a.tier
            .cmp(&b.tier)
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| a.net_id.cmp(&b.net_id))
    }

    pub fn max_consecutive_skips(&self) -> u32 {
        self.config.max_consecutive_skips
    }

    pub fn mark_sent(&mut self, candidate: &Candidate) {
        match candidate.target {
            RecordTarget::Update => self.staleness.remove(&candidate.net_id),
            RecordTarget::Tombstone(ghost) => self.tombstone_staleness.remove(&ghost),
        };
    }

    pub fn mark_skipped(&mut self, candidate: &Candidate) {
        let staleness = match candidate.target {
            RecordTarget::Update => self.staleness.entry(candidate.net_id).or_insert(0),
            RecordTarget::Tombstone(ghost) => self.tombstone_staleness.entry(ghost).or_insert(0),
        };
        *staleness = staleness.saturating_add(1);
    }

    pub fn forget(&mut self, net_id: &NetId) {
        self.staleness.remove(net_id);
    }

    /// Called once a ghost index is free again
    pub fn forget_tombstone(&mut self, ghost: &GhostIndex) {
        self.tombstone_staleness.remove(ghost);
    }
}
