//! 2-D noise sources for the sculptor.

use noise::{NoiseFn, Value};

/// A 2-D noise field with values in [0, 1].
pub trait Noise2D: Send + Sync {
    fn sample(&self, x: f32, y: f32) -> f32;
}

/// Seeded value noise, remapped from [-1, 1] to [0, 1].
#[derive(Debug, Clone)]
pub struct ValueNoise {
    inner: Value,
}

impl ValueNoise {
    pub fn new(seed: u64) -> Self {
        // Fold the high half in so seeds differing only there still differ
        let folded = (seed ^ (seed >> 32)) as u32;
        Self {
            inner: Value::new(folded),
        }
    }
}

impl Noise2D for ValueNoise {
    fn sample(&self, x: f32, y: f32) -> f32 {
        let v = self.inner.get([x as f64, y as f64]) as f32;
        ((v + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// The same value everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantNoise(pub f32);

impl Noise2D for ConstantNoise {
    fn sample(&self, _x: f32, _y: f32) -> f32 {
        self.0
    }
}
