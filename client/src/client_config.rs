use wraith_shared::{Protocol, ShipDynamics};

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    /// Wire settings, must match the server's
    pub protocol: Protocol,
    /// Ship tuning used for prediction, must match the server's
    pub dynamics: ShipDynamics,
    pub prediction: PredictionConfig,
    pub interpolation: InterpolationConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PredictionConfig {
    /// Corrections farther than this many world units snap instead of blending
    pub warp_threshold: f32,
    /// Fraction of the remaining render offset removed per second
    pub correction_blend_rate: f32,
    /// Upper bound on moves kept for replay. The oldest are dropped first.
    pub move_buffer_len: usize,
    /// Number of predicted positions kept as a motion trail
    pub trail_len: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            warp_threshold: 3.0,
            correction_blend_rate: 10.0,
            move_buffer_len: 64,
            trail_len: 32,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterpolationConfig {
    /// Fraction of the render error closed per second
    pub blend_rate: f32,
    /// Cap on the fraction closed in a single frame
    pub max_blend_fraction: f32,
    /// Fastest believable travel between two updates, in units per second.
    /// Anything faster snaps.
    pub max_plausible_speed: f32,
    /// Distance allowed on top of `max_plausible_speed` before snapping
    pub slack: f32,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            blend_rate: 12.0,
            max_blend_fraction: 0.5,
            max_plausible_speed: 400.0,
            slack: 4.0,
        }
    }
}
