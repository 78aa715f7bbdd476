//! Terrace layouts and the absolute height table derived from them.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Where the terrace planes sit, relative to the terrain height range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerraceLayout {
    /// `count` planes at relative heights `i / count` for `i in 0..count`.
    Even { count: usize },
    /// Explicit relative heights, strictly ascending in [0, 1].
    Explicit { heights: Vec<f32> },
}

impl Default for TerraceLayout {
    fn default() -> Self {
        TerraceLayout::Even { count: 8 }
    }
}

impl TerraceLayout {
    /// Relative heights for this layout, validated.
    pub fn relative_heights(&self) -> Result<Vec<f32>, ConfigError> {
        let heights: Vec<f32> = match self {
            TerraceLayout::Even { count } => (0..*count)
                .map(|i| i as f32 / *count as f32)
                .collect(),
            TerraceLayout::Explicit { heights } => heights.clone(),
        };
        validate_relative_heights(&heights)?;
        Ok(heights)
    }

    /// Number of terraces (and sub-meshes) this layout produces.
    pub fn count(&self) -> usize {
        match self {
            TerraceLayout::Even { count } => *count,
            TerraceLayout::Explicit { heights } => heights.len(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.relative_heights().map(|_| ())
    }
}

/// Check that relative heights are non-empty, inside [0, 1] and strictly
/// ascending.
pub fn validate_relative_heights(heights: &[f32]) -> Result<(), ConfigError> {
    if heights.is_empty() {
        return Err(ConfigError::EmptyTerraces);
    }

    for (index, &value) in heights.iter().enumerate() {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::TerraceOutOfRange { index, value });
        }
        if index > 0 {
            let previous = heights[index - 1];
            if value <= previous {
                return Err(ConfigError::TerracesNotAscending {
                    index,
                    previous,
                    value,
                });
            }
        }
    }

    Ok(())
}

/// Build the absolute terrace height table: `min + relative * (max - min)`.
pub fn terrace_table(relative: &[f32], min: f32, max: f32) -> Result<Vec<f32>, ConfigError> {
    if !min.is_finite() || !max.is_finite() || max <= min {
        return Err(ConfigError::InvalidHeightRange { min, max });
    }
    validate_relative_heights(relative)?;

    let span = max - min;
    Ok(relative.iter().map(|r| min + r * span).collect())
}
