use thiserror::Error;

use crate::{MAX_POLYGON_SIDES, MIN_POLYGON_SIDES};

/// Configuration problems, reported before any geometry is allocated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid radius: {0} (must be finite and > 0)")]
    InvalidRadius(f32),
    #[error("Invalid height range: min={min}, max={max} (need 0 <= min < max)")]
    InvalidHeightRange { min: f32, max: f32 },
    #[error("Side count {sides} out of range [{}, {}]", MIN_POLYGON_SIDES, MAX_POLYGON_SIDES)]
    SideCount { sides: u8 },
    #[error("Invalid base frequency: {0} (must be finite and > 0)")]
    InvalidFrequency(f32),
    #[error("Octave count must be at least 1")]
    InvalidOctaves,
    #[error("Invalid persistence: {0} (must be in (0, 1) with more than one octave)")]
    InvalidPersistence(f32),
    #[error("Invalid lacunarity: {0} (must be > 1 with more than one octave)")]
    InvalidLacunarity(f32),
    #[error("Terrace list is empty")]
    EmptyTerraces,
    #[error("Relative terrace height {value} at index {index} is outside [0, 1]")]
    TerraceOutOfRange { index: usize, value: f32 },
    #[error("Terrace heights must be strictly ascending: {previous} then {value} at index {index}")]
    TerracesNotAscending { index: usize, previous: f32, value: f32 },
    #[error("Invalid height curve: {0}")]
    InvalidCurve(String),
    #[error("Subdivision depth {depth} would overflow addressable buffer sizes")]
    DepthOverflow { depth: u32 },
    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}
