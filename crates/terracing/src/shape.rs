//! Base shapes the terrain grows from.
//!
//! Planar shapes lie on the XZ plane at Y = 0 with their outer vertices
//! exactly `radius` from the origin, wound counter-clockwise seen from +Y.
//! The icosahedron is wound counter-clockwise seen from outside.

use std::f32::consts::TAU;

use geometry::{MeshBuffer, MeshCounts};
use glam::Vec3;
use terrace_config::{ConfigError, MAX_POLYGON_SIDES, MIN_POLYGON_SIDES, ShapeKind};
use tracing::debug;

use crate::error::TerrainError;

/// Builds the base mesh for a [`ShapeKind`].
#[derive(Debug, Clone, Copy)]
pub struct ShapeGenerator {
    kind: ShapeKind,
    radius: f32,
}

impl ShapeGenerator {
    pub fn new(kind: ShapeKind, radius: f32) -> Result<Self, TerrainError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigError::InvalidRadius(radius).into());
        }
        if let ShapeKind::Polygon { sides } = kind {
            if sides < MIN_POLYGON_SIDES {
                return Err(ConfigError::SideCount { sides }.into());
            }
        }
        Ok(Self { kind, radius })
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Generate the base mesh.
    pub fn generate(&self) -> Result<MeshBuffer, TerrainError> {
        let mesh = match self.kind {
            ShapeKind::Triangle => triangle(self.radius),
            ShapeKind::Square => square(self.radius),
            ShapeKind::Polygon { sides } => match sides {
                3 => triangle(self.radius),
                4 => square(self.radius),
                5..=MAX_POLYGON_SIDES => polygon(sides, self.radius),
                _ => return Err(TerrainError::UnsupportedShape { sides }),
            },
            ShapeKind::Icosahedron => icosahedron(self.radius),
        };

        debug!(
            "generate: {} with {} vertices, {} triangles",
            self.kind.name(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Vertex, edge and triangle counts of the base mesh, without building it.
    pub fn base_counts(&self) -> Result<MeshCounts, TerrainError> {
        let (vertices, edges, triangles) = match self.kind {
            ShapeKind::Triangle => (3, 3, 1),
            ShapeKind::Square => (4, 5, 2),
            ShapeKind::Polygon { sides } => match sides {
                3 => (3, 3, 1),
                4 => (4, 5, 2),
                5..=MAX_POLYGON_SIDES => {
                    let n = sides as u64;
                    (n + 1, 2 * n, n)
                }
                _ => return Err(TerrainError::UnsupportedShape { sides }),
            },
            ShapeKind::Icosahedron => (12, 30, 20),
        };
        Ok(MeshCounts {
            vertices,
            edges,
            triangles,
        })
    }
}

/// Point `k` of `n` on a counter-clockwise ring around +Y.
fn ring_point(k: u32, n: u32, radius: f32) -> Vec3 {
    let theta = TAU * k as f32 / n as f32;
    Vec3::new(radius * theta.cos(), 0.0, -radius * theta.sin())
}

fn triangle(radius: f32) -> MeshBuffer {
    let mut mesh = MeshBuffer::with_capacity(3, 1);
    for k in 0..3 {
        mesh.push_vertex(ring_point(k, 3, radius));
    }
    mesh.push_triangle(0, 1, 2);
    mesh
}

fn square(radius: f32) -> MeshBuffer {
    let mut mesh = MeshBuffer::with_capacity(4, 2);
    for k in 0..4 {
        mesh.push_vertex(ring_point(k, 4, radius));
    }
    mesh.push_triangle(0, 1, 2);
    mesh.push_triangle(0, 2, 3);
    mesh
}

/// Centre plus `sides` ring vertices, fan-triangulated.
fn polygon(sides: u8, radius: f32) -> MeshBuffer {
    let n = sides as u32;
    let mut mesh = MeshBuffer::with_capacity(n as usize + 1, n as usize);
    let centre = mesh.push_vertex(Vec3::ZERO);
    for k in 0..n {
        mesh.push_vertex(ring_point(k, n, radius));
    }
    for k in 1..=n {
        mesh.push_triangle(centre, k, k % n + 1);
    }
    mesh
}

fn icosahedron(radius: f32) -> MeshBuffer {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;

    #[rustfmt::skip]
    let corners = [
        (-1.0, t, 0.0), (1.0, t, 0.0), (-1.0, -t, 0.0), (1.0, -t, 0.0),
        (0.0, -1.0, t), (0.0, 1.0, t), (0.0, -1.0, -t), (0.0, 1.0, -t),
        (t, 0.0, -1.0), (t, 0.0, 1.0), (-t, 0.0, -1.0), (-t, 0.0, 1.0),
    ];

    #[rustfmt::skip]
    const FACES: [[u32; 3]; 20] = [
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    let mut mesh = MeshBuffer::with_capacity(corners.len(), FACES.len());
    for (x, y, z) in corners {
        mesh.push_vertex(Vec3::new(x, y, z).normalize() * radius);
    }
    for [a, b, c] in FACES {
        mesh.push_triangle(a, b, c);
    }
    mesh
}
