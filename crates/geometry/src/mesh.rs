//! Indexed triangle buffers and their closed-form subdivision counts.

use std::collections::HashSet;

use glam::Vec3;

use crate::validation::{validate_indices, MeshError};

/// Ordered vertices plus counter-clockwise triangle index triples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl MeshBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty buffer with room for exactly the given element counts.
    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(triangles),
        }
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, position: Vec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.triangles.push([a, b, c]);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Corner positions of triangle `index`.
    ///
    /// Call [`validate`](Self::validate) first; out-of-range indices panic.
    pub fn triangle_positions(&self, index: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[index];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        let mut edges = HashSet::with_capacity(self.triangles.len() * 3 / 2 + 1);
        for &[a, b, c] in &self.triangles {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                edges.insert((u.min(v), u.max(v)));
            }
        }
        edges.len()
    }

    /// Current element counts.
    pub fn counts(&self) -> MeshCounts {
        MeshCounts {
            vertices: self.vertices.len() as u64,
            edges: self.edge_count() as u64,
            triangles: self.triangles.len() as u64,
        }
    }

    /// Lowest and highest vertex height under `height_of`.
    pub fn height_bounds(&self, height_of: impl Fn(Vec3) -> f32) -> Option<(f32, f32)> {
        self.vertices.iter().map(|&v| height_of(v)).fold(None, |acc, h| {
            Some(match acc {
                None => (h, h),
                Some((lo, hi)) => (lo.min(h), hi.max(h)),
            })
        })
    }

    /// Check that every triangle references an existing vertex.
    pub fn validate(&self) -> Result<(), MeshError> {
        let flat: &[u32] = bytemuck::cast_slice(&self.triangles);
        validate_indices(flat, self.vertices.len())
    }
}

/// Vertex, edge and triangle counts of a closed-form subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshCounts {
    pub vertices: u64,
    pub edges: u64,
    pub triangles: u64,
}

impl MeshCounts {
    /// Counts after one 1-to-4 split with shared midpoints.
    ///
    /// Returns `None` when the result no longer fits 32-bit indices.
    pub fn split_once(&self) -> Option<Self> {
        let next = Self {
            triangles: self.triangles.checked_mul(4)?,
            edges: self
                .edges
                .checked_mul(2)?
                .checked_add(self.triangles.checked_mul(3)?)?,
            vertices: self.vertices.checked_add(self.edges)?,
        };
        next.fits_u32().then_some(next)
    }

    /// Counts after `depth` splits.
    pub fn subdivided(&self, depth: u32) -> Result<Self, MeshError> {
        (0..depth).try_fold(*self, |counts, _| {
            counts
                .split_once()
                .ok_or(MeshError::CountOverflow { depth })
        })
    }

    /// Whether every vertex and every flattened index fits `u32`.
    pub fn fits_u32(&self) -> bool {
        self.vertices <= u32::MAX as u64
            && self
                .triangles
                .checked_mul(3)
                .is_some_and(|n| n <= u32::MAX as u64)
    }

    pub fn vertices_usize(&self) -> usize {
        self.vertices as usize
    }

    pub fn triangles_usize(&self) -> usize {
        self.triangles as usize
    }
}
