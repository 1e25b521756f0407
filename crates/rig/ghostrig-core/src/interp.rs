//! Rate-based exponential approach used for expression weights and speed smoothing.

use serde::{Deserialize, Serialize};

/// Move `current` toward `target` by the fraction `rate * dt`, clamped to [0, 1].
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * t
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightInterpolator {
    pub current: f32,
    pub target: f32,
    /// Fraction of the remaining distance covered per second.
    pub rate: f32,
}

impl WeightInterpolator {
    pub fn new(rate: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            rate,
        }
    }

    pub fn retarget(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump to `value` and hold it.
    pub fn reset(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    pub fn tick(&mut self, dt: f32) -> f32 {
        self.current = approach(self.current, self.target, self.rate, dt);
        self.current
    }

    pub fn is_settled(&self, eps: f32) -> bool {
        (self.current - self.target).abs() <= eps
    }
}

impl Default for WeightInterpolator {
    fn default() -> Self {
        Self::new(5.0)
    }
}
