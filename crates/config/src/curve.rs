//! Height-response curves applied to normalized noise.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Monotonic mapping from normalized noise in [0, 1] to a response in [0, 1].
///
/// The sculptor multiplies the normalized noise value by the curve response,
/// so a curve that stays low for small inputs flattens valleys while keeping
/// peaks at full height.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeightCurve {
    /// response = t
    #[default]
    Linear,
    /// Hermite smoothstep: 3t² - 2t³
    Smoothstep,
    /// response = t²
    Quadratic,
    /// response = sqrt(t)
    SquareRoot,
    /// Piecewise-linear through `(input, output)` control points.
    ///
    /// Points must be sorted by input, span inputs 0 and 1, and have
    /// non-decreasing outputs in [0, 1].
    Points { points: Vec<[f32; 2]> },
}

impl HeightCurve {
    /// Evaluate the curve at `t` (clamped to [0, 1]).
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let response = match self {
            HeightCurve::Linear => t,
            HeightCurve::Smoothstep => t * t * (3.0 - 2.0 * t),
            HeightCurve::Quadratic => t * t,
            HeightCurve::SquareRoot => t.sqrt(),
            HeightCurve::Points { points } => evaluate_points(points, t),
        };
        response.clamp(0.0, 1.0)
    }

    /// Check that a custom curve is usable. Built-in curves are always valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let HeightCurve::Points { points } = self else {
            return Ok(());
        };

        if points.len() < 2 {
            return Err(ConfigError::InvalidCurve(format!(
                "need at least 2 control points, got {}",
                points.len()
            )));
        }

        let first = points[0];
        let last = points[points.len() - 1];
        if first[0] != 0.0 || last[0] != 1.0 {
            return Err(ConfigError::InvalidCurve(format!(
                "control points must span inputs 0 and 1, got {} to {}",
                first[0], last[0]
            )));
        }

        for (i, pair) in points.windows(2).enumerate() {
            let [a, b] = [pair[0], pair[1]];
            if !(b[0] > a[0]) {
                return Err(ConfigError::InvalidCurve(format!(
                    "inputs must be strictly ascending at point {}",
                    i + 1
                )));
            }
            if b[1] < a[1] {
                return Err(ConfigError::InvalidCurve(format!(
                    "outputs must not decrease at point {}",
                    i + 1
                )));
            }
        }

        if let Some(point) = points.iter().find(|p| !(0.0..=1.0).contains(&p[1])) {
            return Err(ConfigError::InvalidCurve(format!(
                "output {} is outside [0, 1]",
                point[1]
            )));
        }

        Ok(())
    }
}

fn evaluate_points(points: &[[f32; 2]], t: f32) -> f32 {
    let Some(first) = points.first() else {
        return t;
    };
    if t <= first[0] {
        return first[1];
    }

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b[0] {
            let span = b[0] - a[0];
            if span <= 0.0 {
                return b[1];
            }
            let local = (t - a[0]) / span;
            return a[1] + (b[1] - a[1]) * local;
        }
    }

    points[points.len() - 1][1]
}
