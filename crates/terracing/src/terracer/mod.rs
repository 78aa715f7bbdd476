//! Terracing: slice a sculpted mesh into flat floors and vertical walls.
//!
//! Usage is two-phase. [`Terracer::terrace`] does the expensive slicing and
//! may be called for several meshes; [`Terracer::bake`] then merges the
//! working buffers into one immutable [`BakedMesh`] and frees them.
//!
//! ## Algorithm
//!
//! Every triangle is swept through the planes of a [`PlaneSweep`], lowest
//! first. Where a plane cuts it, the part below becomes a floor flattened to
//! the previous plane, a wall quad rises along the cut to the current plane,
//! and the part above carries on to the next plane. Floors and walls of one
//! triangle partition its projection with no gaps or overlaps, and cut points
//! are computed identically on both sides of a shared edge.

mod bake;
mod buffer;
mod sweep;

pub use bake::vertex_normals;
pub use buffer::GeometryBuffer;
pub use sweep::PlaneSweep;

use geometry::{BakedMesh, HeightModel, MeshBuffer, Triangle};
use terrace_config::ConfigError;
use tracing::{debug, trace};

use crate::cancel::CancelSignal;
use crate::error::TerrainError;
use crate::pipeline::Stage;

/// Triangles processed between cancellation checks.
pub const CANCEL_CHECK_INTERVAL: usize = 4096;

/// Counts from one [`Terracer::terrace`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerraceStats {
    pub triangles_in: usize,
    pub floor_triangles: usize,
    pub wall_triangles: usize,
}

#[derive(Debug)]
enum State {
    Collecting {
        floors: GeometryBuffer,
        walls: GeometryBuffer,
        terraced: bool,
    },
    Baked,
}

/// Two-phase terrace builder.
#[derive(Debug)]
pub struct Terracer<M> {
    model: M,
    terraces: Vec<f32>,
    state: State,
}

impl<M: HeightModel> Terracer<M> {
    /// Create a terracer for absolute `terrace_heights`, which must be
    /// finite, non-empty and strictly ascending.
    pub fn new(model: M, terrace_heights: Vec<f32>) -> Result<Self, TerrainError> {
        if terrace_heights.is_empty() {
            return Err(ConfigError::EmptyTerraces.into());
        }
        for (index, &value) in terrace_heights.iter().enumerate() {
            if !value.is_finite() {
                return Err(ConfigError::TerraceOutOfRange { index, value }.into());
            }
            if index > 0 && value <= terrace_heights[index - 1] {
                return Err(ConfigError::TerracesNotAscending {
                    index,
                    previous: terrace_heights[index - 1],
                    value,
                }
                .into());
            }
        }

        let count = terrace_heights.len();
        Ok(Self {
            model,
            terraces: terrace_heights,
            state: State::Collecting {
                floors: GeometryBuffer::new(count),
                walls: GeometryBuffer::new(count),
                terraced: false,
            },
        })
    }

    pub fn terrace_count(&self) -> usize {
        self.terraces.len()
    }

    pub fn terrace_heights(&self) -> &[f32] {
        &self.terraces
    }

    pub fn is_baked(&self) -> bool {
        matches!(self.state, State::Baked)
    }

    /// Slice every triangle of `mesh` into the working buffers.
    pub fn terrace(&mut self, mesh: &MeshBuffer, cancel: &CancelSignal) -> Result<TerraceStats, TerrainError> {
        let State::Collecting {
            floors,
            walls,
            terraced,
        } = &mut self.state
        else {
            return Err(TerrainError::InvalidState("terrace called after bake"));
        };

        mesh.validate()?;
        let model = self.model;
        let Some((lowest, highest)) = mesh.height_bounds(|v| model.height_of(v)) else {
            *terraced = true;
            return Ok(TerraceStats::default());
        };

        let sweep = PlaneSweep::new(&self.terraces, lowest, highest);
        trace!("terrace: sweep planes {:?}", sweep.planes());

        let floors_before = floors.triangle_count();
        let walls_before = walls.triangle_count();
        floors.reserve(mesh.triangle_count());

        for i in 0..mesh.triangle_count() {
            if i % CANCEL_CHECK_INTERVAL == 0 {
                cancel.check(Stage::Terrace)?;
            }
            let triangle = Triangle::from_positions(mesh.triangle_positions(i), &model);
            sweep.slice(triangle, &model, floors, walls)?;
        }
        *terraced = true;

        let stats = TerraceStats {
            triangles_in: mesh.triangle_count(),
            floor_triangles: floors.triangle_count() - floors_before,
            wall_triangles: walls.triangle_count() - walls_before,
        };
        debug!(
            "terrace: {} triangles -> {} floor, {} wall across {} terraces (heights {:.3}..{:.3})",
            stats.triangles_in,
            stats.floor_triangles,
            stats.wall_triangles,
            self.terraces.len(),
            lowest,
            highest
        );
        Ok(stats)
    }

    /// Merge the working buffers into a [`BakedMesh`]. The buffers are freed
    /// and the terracer accepts no further calls.
    pub fn bake(&mut self) -> Result<BakedMesh, TerrainError> {
        match std::mem::replace(&mut self.state, State::Baked) {
            State::Collecting {
                floors,
                walls,
                terraced: true,
            } => bake::bake(floors, walls),
            State::Collecting {
                floors,
                walls,
                terraced: false,
            } => {
                self.state = State::Collecting {
                    floors,
                    walls,
                    terraced: false,
                };
                Err(TerrainError::InvalidState("bake called before terrace"))
            }
            State::Baked => Err(TerrainError::InvalidState("bake called twice")),
        }
    }
}
