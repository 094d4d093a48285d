use highway_input::InputSnapshot;
use serde::{Deserialize, Serialize};

/// Throttle curve constants.
///
/// Each tick applies exactly one of accelerate, brake, or coast, scaled by
/// the quadratic resistance `(speed / max)^2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedParams {
    pub min: f32,
    pub max: f32,
    pub initial: f32,
    /// Acceleration gain `k`.
    pub accel_gain: f32,
    /// Boost factor with the modifier held.
    pub boost: f32,
    /// Boost factor without the modifier.
    pub base_boost: f32,
    pub brake_base: f32,
    pub brake_drag: f32,
    pub coast_base: f32,
    pub coast_drag: f32,
}

impl Default for SpeedParams {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 5.0,
            initial: 2.0,
            accel_gain: 0.0015,
            boost: 5.0,
            base_boost: 1.5,
            brake_base: 0.0025,
            brake_drag: 0.006,
            coast_base: 0.00025,
            coast_drag: 0.0025,
        }
    }
}

impl SpeedParams {
    pub(crate) fn is_valid(&self) -> bool {
        self.min > 0.0
            && self.max > self.min
            && self.max.is_finite()
            && (self.min..=self.max).contains(&self.initial)
            && [
                self.accel_gain,
                self.boost,
                self.base_boost,
                self.brake_base,
                self.brake_drag,
                self.coast_base,
                self.coast_drag,
            ]
            .iter()
            .all(|c| c.is_finite() && *c >= 0.0)
    }
}

/// Forward speed of the vehicle, in world units per tick.
#[derive(Debug, Clone)]
pub struct SpeedModel {
    params: SpeedParams,
    speed: f32,
    /// Speed captured when cruise was engaged.
    cruise: Option<f32>,
}

impl SpeedModel {
    pub fn new(params: SpeedParams) -> Self {
        Self {
            speed: params.initial.clamp(params.min, params.max),
            params,
            cruise: None,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn params(&self) -> &SpeedParams {
        &self.params
    }

    pub fn cruise_control(&self) -> bool {
        self.cruise.is_some()
    }

    /// Engage or release cruise. Engaging pins the current speed.
    pub fn set_cruise(&mut self, engaged: bool) {
        self.cruise = engaged.then_some(self.speed);
    }

    /// Flip cruise and return the new state.
    pub fn toggle_cruise(&mut self) -> bool {
        self.set_cruise(!self.cruise_control());
        self.cruise_control()
    }

    /// `(speed / max)^2`.
    pub fn resistance(&self) -> f32 {
        let ratio = self.speed / self.params.max;
        ratio * ratio
    }

    /// Integrate one tick and return the new speed, which is the distance
    /// the world moves this frame.
    pub fn update(&mut self, input: &InputSnapshot) -> f32 {
        if let Some(pinned) = self.cruise {
            self.speed = pinned;
            return self.speed;
        }

        let p = &self.params;
        let r = self.resistance();
        let change = if input.forward {
            let boost = if input.boost { p.boost } else { p.base_boost };
            boost * p.accel_gain * (1.0 - r)
        } else if input.brake {
            -(p.brake_base + p.brake_drag * r)
        } else {
            -(p.coast_base + p.coast_drag * r)
        };
        self.speed = (self.speed + change).clamp(p.min, p.max);
        self.speed
    }
}
