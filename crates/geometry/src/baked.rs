//! Immutable baked terrain: one vertex buffer, one index list per terrace.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::MAX_U16_VERTICES;
use crate::validation::{validate_indices, MeshError};

/// A baked vertex, laid out for direct GPU upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct BakedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Index width of a baked mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    /// Narrowest format that can address `vertex_count` vertices.
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count > MAX_U16_VERTICES {
            IndexFormat::U32
        } else {
            IndexFormat::U16
        }
    }
}

/// Triangle-list indices of one sub-mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    /// Store `indices` in `format`, failing if one does not fit.
    pub fn pack(indices: Vec<u32>, format: IndexFormat) -> Result<Self, MeshError> {
        match format {
            IndexFormat::U32 => Ok(Indices::U32(indices)),
            IndexFormat::U16 => indices
                .iter()
                .enumerate()
                .map(|(position, &index)| {
                    u16::try_from(index).map_err(|_| MeshError::IndexOutOfRange {
                        position,
                        index,
                        vertex_count: MAX_U16_VERTICES,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Indices::U16),
        }
    }

    pub fn format(&self) -> IndexFormat {
        match self {
            Indices::U16(_) => IndexFormat::U16,
            Indices::U32(_) => IndexFormat::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Indices::U16(v) => v.len(),
            Indices::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn triangle_count(&self) -> usize {
        self.len() / 3
    }

    /// Indices widened to `u32`.
    pub fn iter(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            Indices::U16(v) => Box::new(v.iter().map(|&i| i as u32)),
            Indices::U32(v) => Box::new(v.iter().copied()),
        }
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U16(v) => bytemuck::cast_slice(v),
            Indices::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Final output of a generation run. Exposes no mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedMesh {
    vertices: Vec<BakedVertex>,
    submeshes: Vec<Indices>,
    format: IndexFormat,
}

impl BakedMesh {
    /// Validate `submeshes` against `vertices` and pack them in the narrowest
    /// index format.
    pub fn new(vertices: Vec<BakedVertex>, submeshes: Vec<Vec<u32>>) -> Result<Self, MeshError> {
        let format = IndexFormat::for_vertex_count(vertices.len());
        for indices in &submeshes {
            validate_indices(indices, vertices.len())?;
        }

        let submeshes = submeshes
            .into_iter()
            .map(|indices| Indices::pack(indices, format))
            .collect::<Result<Vec<_>, _>>()?;
        trace!(
            "BakedMesh::new: {} vertices, {} sub-meshes, {:?} indices",
            vertices.len(),
            submeshes.len(),
            format
        );

        Ok(Self {
            vertices,
            submeshes,
            format,
        })
    }

    pub fn vertices(&self) -> &[BakedVertex] {
        &self.vertices
    }

    pub fn submeshes(&self) -> &[Indices] {
        &self.submeshes
    }

    pub fn submesh(&self, terrace: usize) -> Option<&Indices> {
        self.submeshes.get(terrace)
    }

    pub fn index_format(&self) -> IndexFormat {
        self.format
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(Indices::triangle_count).sum()
    }

    pub fn position(&self, index: u32) -> Option<Vec3> {
        self.vertices
            .get(index as usize)
            .map(|v| Vec3::from_array(v.position))
    }

    /// Vertex buffer bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(feature = "bevy")]
mod bevy_adapter {
    use super::{BakedMesh, Indices};
    use bevy::asset::RenderAssetUsages;
    use bevy::mesh::{Indices as MeshIndices, PrimitiveTopology};
    use bevy::prelude::*;

    impl BakedMesh {
        /// One Bevy mesh per terrace. Each mesh carries the full vertex
        /// buffer; call on the thread that owns the assets.
        pub fn to_bevy_meshes(&self) -> Vec<Mesh> {
            let positions: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.position).collect();
            let normals: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.normal).collect();

            self.submeshes
                .iter()
                .map(|indices| {
                    let mut mesh = Mesh::new(
                        PrimitiveTopology::TriangleList,
                        RenderAssetUsages::default(),
                    );
                    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions.clone());
                    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals.clone());
                    mesh.insert_indices(match indices {
                        Indices::U16(v) => MeshIndices::U16(v.clone()),
                        Indices::U32(v) => MeshIndices::U32(v.clone()),
                    });
                    mesh
                })
                .collect()
        }
    }
}
