//! Procedural terraced terrain.
//!
//! This crate turns a [`TerrainConfig`] into a [`BakedMesh`] of stepped
//! terrain with:
//! - Planar polygons and radial icosphere planets from the same pipeline
//! - Uniform 1-to-4 subdivision with shared midpoints
//! - Seeded multi-octave noise sculpting
//! - Terrace slicing into flat floors and vertical walls, one sub-mesh per terrace
//!
//! # Architecture
//!
//! Generation is a fixed sequence of stages, each consuming the previous
//! stage's output:
//!
//! - **Shape**: base mesh for the configured [`ShapeKind`]
//! - **Fragment**: `depth` rounds of midpoint subdivision
//! - **Sculpt**: noise heights along the surface's height axis
//! - **Terrace**: plane sweep into per-terrace floors and walls
//! - **Bake**: merge, compute normals and pack indices
//!
//! The surface model ([`Planar`] or [`Radial`]) is a type parameter of every
//! stage, so the planar and spherical paths share one implementation.
//! [`TerrainGenerator`] runs the pipeline inline or on tokio's blocking pool
//! and cancels in-flight runs when dropped.

pub mod cancel;
pub mod error;
pub mod fragment;
pub mod noise;
pub mod pipeline;
pub mod sculpt;
pub mod shape;
pub mod terracer;

pub use cancel::{CancelSignal, CancelToken};
pub use error::TerrainError;
pub use pipeline::{GenerationStats, Stage, TerrainGenerator, run_pipeline, run_pipeline_with_stats};
pub use shape::ShapeGenerator;
pub use terracer::{TerraceStats, Terracer};

pub use geometry::{BakedMesh, BakedVertex, HeightModel, IndexFormat, Indices, MeshBuffer, Planar, Radial};
pub use terrace_config::{ConfigError, NoiseSettings, ShapeKind, Surface, TerraceLayout, TerrainConfig};
