use std::collections::VecDeque;

use glam::Vec2;
use log::{debug, warn};

use wraith_shared::{
    sequence_greater_than, simulate_move, ControlState, MotionState, Move, MoveSequence,
    ShipDynamics, TriggerFlags,
};

use crate::client_config::PredictionConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictionPhase {
    /// Every predicted move has been confirmed, or nothing is controlled
    Idle,
    /// Moves were predicted that the authority has not confirmed yet
    AwaitingReconciliation,
    /// Re-simulating buffered moves on top of an authoritative state
    Replaying,
}

/// What a reconciliation did to the predicted state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Correction {
    /// Distance between the prediction before and after the correction
    pub distance: f32,
    /// The renderer snapped instead of blending
    pub warped: bool,
    /// The authority teleported the entity
    pub teleported: bool,
    /// Buffered moves replayed on top of the authoritative state
    pub replayed: usize,
}

/// Client-side prediction of the one locally controlled ship.
///
/// Moves are simulated as soon as they are made and kept until the authority
/// reports them processed. Each authoritative update resets the state and
/// replays whatever is still unconfirmed, and the visual difference is
/// either blended away or snapped.
pub struct PredictionEngine {
    config: PredictionConfig,
    dynamics: ShipDynamics,
    phase: PredictionPhase,
    state: Option<ControlState>,
    render_offset: Vec2,
    teleport_epoch: u8,
    moves: VecDeque<Move>,
    next_sequence: MoveSequence,
    trail: VecDeque<Vec2>,
}

impl PredictionEngine {
    pub fn new(config: PredictionConfig, dynamics: ShipDynamics) -> Self {
        Self {
            config,
            dynamics,
            phase: PredictionPhase::Idle,
            state: None,
            render_offset: Vec2::ZERO,
            teleport_epoch: 0,
            moves: VecDeque::new(),
            next_sequence: 0,
            trail: VecDeque::new(),
        }
    }

    pub fn phase(&self) -> PredictionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Starts predicting from an authoritative state
    pub fn begin(&mut self, state: MotionState, teleport_epoch: u8) {
        self.state = Some(ControlState::new(state));
        self.teleport_epoch = teleport_epoch;
        self.render_offset = Vec2::ZERO;
        self.moves.clear();
        self.trail.clear();
        self.trail.push_back(state.position);
        self.phase = PredictionPhase::Idle;
    }

    /// Stops predicting. Sequence numbers keep counting.
    pub fn end(&mut self) {
        self.state = None;
        self.render_offset = Vec2::ZERO;
        self.moves.clear();
        self.trail.clear();
        self.phase = PredictionPhase::Idle;
    }

    /// Makes a move from local input and simulates it immediately. Returns
    /// `None` when nothing is being predicted.
    pub fn predict(
        &mut self,
        thrust: Vec2,
        triggers: TriggerFlags,
        facing: f32,
        duration_ms: u16,
    ) -> Option<Move> {
        let state = self.state.as_mut()?;

        let next_move = Move::new(self.next_sequence, thrust, triggers, facing, duration_ms);
        self.next_sequence = self.next_sequence.wrapping_add(1);

        simulate_move(&mut state.actual, &next_move, &self.dynamics);
        let actual = state.actual;
        Self::render(state, self.render_offset);

        self.moves.push_back(next_move);
        while self.moves.len() > self.config.move_buffer_len {
            if let Some(dropped) = self.moves.pop_front() {
                debug!("move buffer full, dropped move {}", dropped.sequence);
            }
        }
        self.push_trail(actual.position);
        self.phase = PredictionPhase::AwaitingReconciliation;

        Some(next_move)
    }

    /// Applies an authoritative state for the controlled ship.
    ///
    /// Moves at or before `last_processed` are already part of `authoritative`
    /// and are discarded. The rest are replayed in order on top of it.
    pub fn reconcile(
        &mut self,
        authoritative: MotionState,
        teleport_epoch: u8,
        last_processed: Option<MoveSequence>,
    ) -> Option<Correction> {
        let Some(state) = self.state.as_mut() else {
            return None;
        };

        if let Some(last) = last_processed {
            while let Some(oldest) = self.moves.front() {
                if sequence_greater_than(oldest.sequence, last) {
                    break;
                }
                self.moves.pop_front();
            }
        }

        self.phase = PredictionPhase::Replaying;
        let predicted = state.actual;
        let rendered = state.rendered;
        state.actual = authoritative;
        for next_move in self.moves.iter() {
            simulate_move(&mut state.actual, next_move, &self.dynamics);
        }

        let distance = predicted.position.distance(state.actual.position);
        let teleported = teleport_epoch != self.teleport_epoch;
        let warped = teleported || distance > self.config.warp_threshold;
        self.teleport_epoch = teleport_epoch;

        if warped {
            if !teleported {
                warn!(
                    "diverged replay: prediction was {} units off after {} moves, snapping",
                    distance,
                    self.moves.len()
                );
            }
            self.render_offset = Vec2::ZERO;
            Self::render(state, self.render_offset);
            let position = state.actual.position;
            self.trail.clear();
            self.trail.push_back(position);
        } else {
            // keep drawing where we were and blend the difference away
            self.render_offset = rendered.position - state.actual.position;
            Self::render(state, self.render_offset);
        }

        self.phase = if self.moves.is_empty() {
            PredictionPhase::Idle
        } else {
            PredictionPhase::AwaitingReconciliation
        };

        Some(Correction {
            distance,
            warped,
            teleported,
            replayed: self.moves.len(),
        })
    }

    /// Decays the render offset left by a blended correction
    pub fn advance_frame(&mut self, seconds: f32) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let decay = (self.config.correction_blend_rate * seconds).clamp(0.0, 1.0);
        self.render_offset *= 1.0 - decay;
        if self.render_offset.length() < 1.0e-4 {
            self.render_offset = Vec2::ZERO;
        }
        Self::render(state, self.render_offset);
    }

    fn render(state: &mut ControlState, offset: Vec2) {
        state.snap_rendered();
        state.rendered.position += offset;
    }

    fn push_trail(&mut self, position: Vec2) {
        self.trail.push_back(position);
        while self.trail.len() > self.config.trail_len {
            self.trail.pop_front();
        }
    }

    pub fn control_state(&self) -> Option<&ControlState> {
        self.state.as_ref()
    }

    pub fn render_offset(&self) -> Vec2 {
        self.render_offset
    }

    /// Recent predicted positions, oldest first
    pub fn trail(&self) -> &VecDeque<Vec2> {
        &self.trail
    }

    /// Moves not yet confirmed by the authority, oldest first
    pub fn pending_moves(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter()
    }

    /// The newest `max` unconfirmed moves, oldest first, for the next move
    /// packet
    pub fn outgoing_moves(&self, max: usize) -> Vec<Move> {
        let skip = self.moves.len().saturating_sub(max);
        self.moves.iter().skip(skip).copied().collect()
    }

    pub fn next_sequence(&self) -> MoveSequence {
        self.next_sequence
    }
}
