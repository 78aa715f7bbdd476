//! Per-terrace triangle accumulation with a de-duplicated vertex pool.

use std::collections::HashMap;

use geometry::DEGENERATE_RELATIVE_EPSILON;
use glam::Vec3;

use crate::error::TerrainError;

/// Exact position key. `-0.0` and `0.0` map to the same key.
fn position_key(p: Vec3) -> [u32; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

/// Zero area relative to the triangle's own size.
fn is_degenerate([a, b, c]: [Vec3; 3]) -> bool {
    let cross = (b - a).cross(c - a).length_squared();
    let longest = (b - a)
        .length_squared()
        .max((c - b).length_squared())
        .max((a - c).length_squared());
    cross <= DEGENERATE_RELATIVE_EPSILON * longest * longest
}

/// Vertex pool plus one index list per terrace.
#[derive(Debug, Default)]
pub struct GeometryBuffer {
    vertices: Vec<Vec3>,
    lookup: HashMap<[u32; 3], u32>,
    terraces: Vec<Vec<u32>>,
}

impl GeometryBuffer {
    pub fn new(terrace_count: usize) -> Self {
        Self {
            vertices: Vec::new(),
            lookup: HashMap::new(),
            terraces: vec![Vec::new(); terrace_count],
        }
    }

    /// Reserve room for roughly `triangles` more triangles.
    pub fn reserve(&mut self, triangles: usize) {
        self.vertices.reserve(triangles);
        self.lookup.reserve(triangles);
    }

    /// Add a triangle to `terrace`. Degenerate triangles are dropped before
    /// touching the pool; returns whether the triangle was kept.
    pub fn add_triangle(&mut self, terrace: usize, corners: [Vec3; 3]) -> Result<bool, TerrainError> {
        if terrace >= self.terraces.len() {
            return Err(TerrainError::Invariant(format!(
                "terrace {} out of range for {} terraces",
                terrace,
                self.terraces.len()
            )));
        }

        let keys = corners.map(position_key);
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
            return Ok(false);
        }
        if is_degenerate(corners) {
            return Ok(false);
        }

        let mut indices = [0u32; 3];
        for ((slot, key), position) in indices.iter_mut().zip(keys).zip(corners) {
            *slot = self.vertex(key, position);
        }
        self.terraces[terrace].extend_from_slice(&indices);
        Ok(true)
    }

    fn vertex(&mut self, key: [u32; 3], position: Vec3) -> u32 {
        let vertices = &mut self.vertices;
        *self.lookup.entry(key).or_insert_with(|| {
            let index = vertices.len() as u32;
            vertices.push(position);
            index
        })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn terrace_count(&self) -> usize {
        self.terraces.len()
    }

    pub fn terrace_indices(&self, terrace: usize) -> &[u32] {
        self.terraces.get(terrace).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn triangle_count(&self) -> usize {
        self.terraces.iter().map(|t| t.len() / 3).sum()
    }

    /// Give up the pool and index lists. The lookup table is dropped.
    pub fn into_parts(self) -> (Vec<Vec3>, Vec<Vec<u32>>) {
        (self.vertices, self.terraces)
    }
}
