//! Terrace geometry - mesh data structures shared by the generator
//!
//! This crate provides the core data types for terrain generation:
//! - [`mesh::MeshBuffer`] - Indexed triangle buffer used between stages
//! - [`mesh::MeshCounts`] - Closed-form element counts for subdivision
//! - [`model::HeightModel`] - Planar and radial height semantics
//! - [`slice`] - Corners, triangles and polygons cut by height planes
//! - [`baked::BakedMesh`] - Immutable output with per-terrace sub-meshes
//! - [`validation`] - Mesh errors and index checks

pub mod baked;
pub mod constants;
pub mod mesh;
pub mod model;
pub mod slice;
pub mod validation;

pub use baked::*;
pub use constants::*;
pub use mesh::*;
pub use model::*;
pub use slice::*;
pub use validation::*;
