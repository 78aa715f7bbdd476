//! Shared configuration for terraced terrain generation
//!
//! This crate is the single source of truth for what a generation run is
//! asked to do: the base shape, its size and height range, subdivision depth,
//! noise settings and terrace layout. Everything here is plain serde data,
//! validated up front so the pipeline never fails halfway on bad input.

mod curve;
mod error;
mod noise;
mod terraces;

pub use curve::HeightCurve;
pub use error::ConfigError;
pub use noise::{NoiseSettings, Normalization};
pub use terraces::{TerraceLayout, terrace_table, validate_relative_heights};

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Fewest sides a polygon shape may have
pub const MIN_POLYGON_SIDES: u8 = 3;

/// Most sides a polygon shape may have
pub const MAX_POLYGON_SIDES: u8 = 10;

/// Default shape size (polygon radius or sphere radius)
pub const DEFAULT_RADIUS: f32 = 10.0;

/// Default highest terrain height
pub const DEFAULT_MAX_HEIGHT: f32 = 4.0;

/// Default subdivision depth
pub const DEFAULT_DEPTH: u32 = 5;

/// How a shape measures height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Height is the Y coordinate; the shape lies on the XZ plane.
    Planar,
    /// Height is the distance from the origin.
    Radial,
}

/// The seed shape the terrain is grown from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    /// Equilateral triangle.
    Triangle,
    /// Square.
    Square,
    /// Regular polygon with `sides` in [3, 10].
    Polygon { sides: u8 },
    /// Icosahedron, subdivided towards a sphere.
    Icosahedron,
}

impl Default for ShapeKind {
    fn default() -> Self {
        ShapeKind::Polygon { sides: 6 }
    }
}

impl ShapeKind {
    /// Coordinate system this shape uses for heights.
    pub fn surface(&self) -> Surface {
        match self {
            ShapeKind::Icosahedron => Surface::Radial,
            _ => Surface::Planar,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Triangle => "triangle",
            ShapeKind::Square => "square",
            ShapeKind::Polygon { .. } => "polygon",
            ShapeKind::Icosahedron => "icosahedron",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let ShapeKind::Polygon { sides } = *self {
            if !(MIN_POLYGON_SIDES..=MAX_POLYGON_SIDES).contains(&sides) {
                return Err(ConfigError::SideCount { sides });
            }
        }
        Ok(())
    }
}

/// Complete description of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed shape.
    pub shape: ShapeKind,
    /// Polygon radius, or sphere radius for radial shapes.
    pub radius: f32,
    /// Lowest terrain height. Radial shapes sculpt down to it; the terrace
    /// table starts from it for both surfaces.
    pub min_height: f32,
    /// Highest terrain height.
    pub max_height: f32,
    /// Number of 1-to-4 subdivision passes.
    pub depth: u32,
    /// Noise used to sculpt hills and valleys.
    pub noise: NoiseSettings,
    /// Terrace plane layout.
    pub terraces: TerraceLayout,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            shape: ShapeKind::default(),
            radius: DEFAULT_RADIUS,
            min_height: 0.0,
            max_height: DEFAULT_MAX_HEIGHT,
            depth: DEFAULT_DEPTH,
            noise: NoiseSettings::default(),
            terraces: TerraceLayout::default(),
        }
    }
}

impl TerrainConfig {
    /// Rolling hills on a hexagon.
    pub fn hills() -> Self {
        Self {
            noise: NoiseSettings {
                curve: Some(HeightCurve::Smoothstep),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Terraced planetoid grown from an icosahedron.
    pub fn planet() -> Self {
        Self {
            shape: ShapeKind::Icosahedron,
            radius: 10.0,
            min_height: 9.0,
            max_height: 12.0,
            depth: 4,
            noise: NoiseSettings {
                frequency: 0.2,
                octaves: 5,
                persistence: 0.5,
                lacunarity: 2.0,
                ..Default::default()
            },
            terraces: TerraceLayout::Even { count: 6 },
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Absolute terrace heights for this configuration.
    pub fn terrace_heights(&self) -> Result<Vec<f32>, ConfigError> {
        terrace_table(
            &self.terraces.relative_heights()?,
            self.min_height,
            self.max_height,
        )
    }

    /// Check every field. Depth overflow depends on the shape's element
    /// counts and is checked by the pipeline alongside this.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shape.validate()?;

        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ConfigError::InvalidRadius(self.radius));
        }
        if !self.min_height.is_finite()
            || !self.max_height.is_finite()
            || self.min_height < 0.0
            || self.max_height <= self.min_height
        {
            return Err(ConfigError::InvalidHeightRange {
                min: self.min_height,
                max: self.max_height,
            });
        }

        self.noise.validate()?;
        self.terraces.validate()?;
        Ok(())
    }
}
