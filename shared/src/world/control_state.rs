use std::f32::consts::TAU;

use glam::Vec2;

/// World units between adjacent representable positions
pub const POSITION_GRID: f32 = 1.0 / 64.0;
/// Units per second between adjacent representable velocities
pub const VELOCITY_GRID: f32 = 1.0 / 256.0;
/// Number of representable headings in a full turn
pub const FACING_STEPS: i64 = 1024;

pub(crate) fn facing_unit() -> f32 {
    TAU / FACING_STEPS as f32
}

/// Rounds `value` onto a grid of `grid` units. The result is one of the
/// values a compressed point with the same scale decodes to.
pub fn snap_to_grid(value: f32, grid: f32) -> f32 {
    let snapped = (value / grid).round() * grid;
    // normalize negative zero, the wire only ever yields positive zero
    if snapped == 0.0 || snapped.is_nan() {
        0.0
    } else {
        snapped
    }
}

/// Like [`snap_to_grid`] but always rounds toward zero, so repeated decay
/// (drag) is never held in place by rounding.
pub fn snap_toward_zero(value: f32, grid: f32) -> f32 {
    let snapped = (value / grid).trunc() * grid;
    if snapped == 0.0 || snapped.is_nan() {
        0.0
    } else {
        snapped
    }
}

pub fn snap_vec(value: Vec2, grid: f32) -> Vec2 {
    Vec2::new(snap_to_grid(value.x, grid), snap_to_grid(value.y, grid))
}

/// Index of the heading step closest to `facing` (radians, any winding)
pub fn facing_to_step(facing: f32) -> i64 {
    if !facing.is_finite() {
        return 0;
    }
    let turn = facing.rem_euclid(TAU);
    ((turn / facing_unit()).round() as i64).rem_euclid(FACING_STEPS)
}

pub fn step_to_facing(step: i64) -> f32 {
    step as f32 * facing_unit()
}

pub fn snap_facing(facing: f32) -> f32 {
    step_to_facing(facing_to_step(facing))
}

/// Kinematic state of a moving object.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: f32,
}

impl MotionState {
    pub fn new(position: Vec2, velocity: Vec2, facing: f32) -> Self {
        let mut state = Self {
            position,
            velocity,
            facing,
        };
        state.snap();
        state
    }

    /// Moves every field onto the wire grid. Simulation calls this after each
    /// step so that authoritative values decode bit-identically on clients.
    pub fn snap(&mut self) {
        self.position = snap_vec(self.position, POSITION_GRID);
        self.velocity = Vec2::new(
            snap_toward_zero(self.velocity.x, VELOCITY_GRID),
            snap_toward_zero(self.velocity.y, VELOCITY_GRID),
        );
        self.facing = snap_facing(self.facing);
    }

    /// Position after travelling `seconds` along the current velocity
    pub fn extrapolate(&self, seconds: f32) -> Self {
        Self {
            position: self.position + self.velocity * seconds,
            velocity: self.velocity,
            facing: self.facing,
        }
    }

    pub fn bit_identical(&self, other: &Self) -> bool {
        self.position.x.to_bits() == other.position.x.to_bits()
            && self.position.y.to_bits() == other.position.y.to_bits()
            && self.velocity.x.to_bits() == other.velocity.x.to_bits()
            && self.velocity.y.to_bits() == other.velocity.y.to_bits()
            && self.facing.to_bits() == other.facing.to_bits()
    }
}

/// Double-buffered state of the locally controlled entity: `actual` is the
/// predicted simulation result, `rendered` is what gets drawn this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlState {
    pub actual: MotionState,
    pub rendered: MotionState,
}

impl ControlState {
    pub fn new(state: MotionState) -> Self {
        Self {
            actual: state,
            rendered: state,
        }
    }

    pub fn snap_rendered(&mut self) {
        self.rendered = self.actual;
    }
}
