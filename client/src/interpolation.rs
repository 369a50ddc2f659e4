use std::f32::consts::{PI, TAU};

use wraith_shared::MotionState;

use crate::client_config::InterpolationConfig;

/// Smooths the drawn state of one remote object toward its latest
/// authoritative state.
#[derive(Clone, Debug, PartialEq)]
pub struct Interpolator {
    /// Last authoritative state, extrapolated each frame
    authoritative: MotionState,
    /// Authoritative state exactly as received
    received: MotionState,
    rendered: MotionState,
    teleport_epoch: u8,
    since_update: f32,
}

impl Interpolator {
    pub fn new(state: MotionState, teleport_epoch: u8) -> Self {
        Self {
            authoritative: state,
            received: state,
            rendered: state,
            teleport_epoch,
            since_update: 0.0,
        }
    }

    /// Takes a new authoritative state. Returns true if the rendered state
    /// snapped to it instead of blending.
    pub fn on_update(
        &mut self,
        state: MotionState,
        teleport_epoch: u8,
        config: &InterpolationConfig,
    ) -> bool {
        let travel = self.received.position.distance(state.position);
        let plausible = config.max_plausible_speed * self.since_update + config.slack;
        let snap = teleport_epoch != self.teleport_epoch || travel > plausible;

        self.authoritative = state;
        self.received = state;
        self.teleport_epoch = teleport_epoch;
        self.since_update = 0.0;
        if snap {
            self.rendered = state;
        }
        snap
    }

    /// Moves both states along their velocities, then blends the rendered
    /// one toward the authoritative one.
    pub fn advance(&mut self, seconds: f32, config: &InterpolationConfig) {
        self.since_update += seconds;
        self.authoritative = self.authoritative.extrapolate(seconds);
        self.rendered = self.rendered.extrapolate(seconds);

        let fraction = (config.blend_rate * seconds)
            .min(config.max_blend_fraction)
            .clamp(0.0, 1.0);
        self.rendered.position = self
            .rendered
            .position
            .lerp(self.authoritative.position, fraction);
        self.rendered.velocity = self
            .rendered
            .velocity
            .lerp(self.authoritative.velocity, fraction);
        self.rendered.facing =
            lerp_angle(self.rendered.facing, self.authoritative.facing, fraction);
    }

    pub fn rendered(&self) -> &MotionState {
        &self.rendered
    }

    pub fn authoritative(&self) -> &MotionState {
        &self.authoritative
    }
}

// shortest way around
fn lerp_angle(from: f32, to: f32, fraction: f32) -> f32 {
    let delta = (to - from + PI).rem_euclid(TAU) - PI;
    (from + delta * fraction).rem_euclid(TAU)
}
