use crate::{
    moves::{Move, TriggerFlags},
    world::control_state::MotionState,
};

/// Movement tuning for ships. Both ends of a connection must use the same
/// values or replay will diverge from the authority.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipDynamics {
    /// Acceleration at full thrust, in units per second squared
    pub thrust_accel: f32,
    /// Multiplier applied to acceleration and top speed while boosting
    pub boost_multiplier: f32,
    /// Fraction of velocity lost per second
    pub drag: f32,
    /// Top speed without boost, in units per second
    pub max_speed: f32,
    /// Speeds below this settle to a full stop
    pub rest_speed: f32,
}

impl Default for ShipDynamics {
    fn default() -> Self {
        Self {
            thrust_accel: 120.0,
            boost_multiplier: 1.75,
            drag: 0.6,
            max_speed: 90.0,
            rest_speed: 0.05,
        }
    }
}

/// Advances `state` by one move. Pure and deterministic: the same start
/// state, move and dynamics always produce a bit-identical result, which is
/// what lets clients replay unacknowledged moves on top of a correction.
pub fn simulate_move(state: &mut MotionState, next_move: &Move, dynamics: &ShipDynamics) {
    let seconds = next_move.seconds();
    let boosting = next_move.triggers.contains(TriggerFlags::BOOST);
    let boost = if boosting { dynamics.boost_multiplier } else { 1.0 };

    state.facing = next_move.facing;
    state.velocity += next_move.thrust * (dynamics.thrust_accel * boost * seconds);
    apply_drag(state, seconds, dynamics);
    state.velocity = state.velocity.clamp_length_max(dynamics.max_speed * boost);
    state.position += state.velocity * seconds;
    state.snap();
}

/// Advances an uncontrolled ship, which keeps drifting under drag alone.
pub fn coast(state: &mut MotionState, seconds: f32, dynamics: &ShipDynamics) {
    apply_drag(state, seconds, dynamics);
    state.position += state.velocity * seconds;
    state.snap();
}

fn apply_drag(state: &mut MotionState, seconds: f32, dynamics: &ShipDynamics) {
    let retained = (1.0 - dynamics.drag * seconds).max(0.0);
    state.velocity *= retained;
    if state.velocity.length() < dynamics.rest_speed {
        state.velocity = glam::Vec2::ZERO;
    }
}
