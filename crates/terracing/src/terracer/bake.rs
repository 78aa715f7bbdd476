//! Merge floor and wall buffers into the final [`BakedMesh`].

use geometry::{validate_indices, BakedMesh, BakedVertex, MeshError};
use glam::Vec3;
use tracing::debug;

use super::buffer::GeometryBuffer;
use crate::error::TerrainError;

/// Concatenate the floor and wall pools and build one sub-mesh per terrace:
/// its floor indices followed by its wall indices.
///
/// The pools are not de-duplicated against each other, so walls keep hard
/// edges where they meet floors.
pub fn bake(floors: GeometryBuffer, walls: GeometryBuffer) -> Result<BakedMesh, TerrainError> {
    let (floor_vertices, floor_lists) = floors.into_parts();
    let (wall_vertices, wall_lists) = walls.into_parts();

    let total = floor_vertices.len() + wall_vertices.len();
    if u32::try_from(total).is_err() {
        return Err(MeshError::IndexOutOfRange {
            position: 0,
            index: u32::MAX,
            vertex_count: total,
        }
        .into());
    }
    let offset = floor_vertices.len() as u32;

    let submeshes: Vec<Vec<u32>> = floor_lists
        .into_iter()
        .zip(wall_lists)
        .map(|(mut indices, wall)| {
            indices.extend(wall.into_iter().map(|i| i + offset));
            indices
        })
        .collect();

    let mut positions = floor_vertices;
    positions.extend(wall_vertices);
    for indices in &submeshes {
        validate_indices(indices, positions.len())?;
    }

    let normals = vertex_normals(&positions, &submeshes);
    let vertices: Vec<BakedVertex> = positions
        .iter()
        .zip(normals)
        .map(|(p, n)| BakedVertex {
            position: p.to_array(),
            normal: n.to_array(),
        })
        .collect();

    let baked = BakedMesh::new(vertices, submeshes)?;
    debug!(
        "bake: {} vertices ({} from floors), {} triangles, {:?} indices",
        baked.vertex_count(),
        offset,
        baked.triangle_count(),
        baked.index_format()
    );
    Ok(baked)
}

/// Area-weighted vertex normals. Indices must already be validated.
pub fn vertex_normals(positions: &[Vec3], submeshes: &[Vec<u32>]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for triangle in submeshes.iter().flat_map(|indices| indices.chunks_exact(3)) {
        let [a, b, c] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        // Unnormalized cross product: its length is twice the area
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    for normal in &mut normals {
        *normal = normal.normalize_or_zero();
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry::IndexFormat;

    #[test]
    fn test_bake_offsets_wall_indices() {
        let mut floors = GeometryBuffer::new(2);
        let mut walls = GeometryBuffer::new(2);
        floors
            .add_triangle(0, [Vec3::ZERO, Vec3::Z, Vec3::X])
            .unwrap();
        walls
            .add_triangle(1, [Vec3::X, Vec3::ZERO, Vec3::Y])
            .unwrap();

        let baked = bake(floors, walls).unwrap();
        assert_eq!(baked.vertex_count(), 6);
        assert_eq!(baked.submesh_count(), 2);
        assert_eq!(baked.index_format(), IndexFormat::U16);
        assert_eq!(baked.submesh(0).unwrap().iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(baked.submesh(1).unwrap().iter().collect::<Vec<_>>(), vec![3, 4, 5]);

        // Wall vertices never alias floor vertices
        assert_eq!(baked.position(1), Some(Vec3::Z));
        assert_eq!(baked.position(4), Some(Vec3::ZERO));
    }

    #[test]
    fn test_normals_are_area_weighted() {
        let positions = [
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            // Small tilted triangle sharing vertex 0
            Vec3::new(0.0, 0.01, 0.01),
        ];
        let normals = vertex_normals(&positions, &[vec![0, 1, 2, 0, 3, 1]]);
        assert!((normals[2] - Vec3::Y).length() < 1e-6);
        assert!(normals[0].y > 0.99, "large face dominates: {:?}", normals[0]);
        for n in &normals {
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_floor_normals_point_up() {
        let mut floors = GeometryBuffer::new(1);
        floors
            .add_triangle(0, [Vec3::ZERO, Vec3::Z, Vec3::X])
            .unwrap();
        let baked = bake(floors, GeometryBuffer::new(1)).unwrap();
        for v in baked.vertices() {
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }
}
