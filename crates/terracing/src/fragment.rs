//! Uniform 1-to-4 subdivision.
//!
//! Each pass splits every triangle at its edge midpoints:
//! ```text
//!         v3                      v3
//!        /  \                    /  \
//!       /    \                 m31--m23
//!      /      \      ->        / \  / \
//!     /        \              /   \/   \
//!   v1----------v2          v1----m12---v2
//! ```
//! Midpoints are shared by the two triangles on an edge, so element counts
//! follow [`MeshCounts`] exactly and every buffer is sized once up front.

use std::collections::HashMap;

use geometry::{HeightModel, MeshBuffer, MeshCounts};
use glam::Vec3;
use tracing::{debug, trace};

/// Subdivide `mesh` `depth` times, placing midpoints with `model`.
///
/// Winding is preserved. Depth 0 returns the input unchanged.
pub fn fragment<M: HeightModel>(mesh: MeshBuffer, depth: u32, model: &M) -> MeshBuffer {
    if depth == 0 {
        return mesh;
    }

    let base = mesh.counts();
    let target = base.subdivided(depth).ok();
    // The edge map never holds more than the edges of the last pass's input
    let last_edges = base
        .subdivided(depth - 1)
        .map_or(base.edges, |counts: MeshCounts| counts.edges);

    let MeshBuffer {
        mut vertices,
        triangles,
    } = mesh;

    let (vertex_capacity, triangle_capacity) = target.map_or(
        (vertices.len(), triangles.len()),
        |counts| (counts.vertices_usize(), counts.triangles_usize()),
    );
    vertices.reserve_exact(vertex_capacity.saturating_sub(vertices.len()));

    let mut read = triangles;
    read.reserve_exact(triangle_capacity.saturating_sub(read.len()));
    let mut write: Vec<[u32; 3]> = Vec::with_capacity(triangle_capacity);
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::with_capacity(last_edges as usize);

    for level in 0..depth {
        write.clear();
        midpoints.clear();

        for &[v1, v2, v3] in &read {
            let m12 = midpoint(&mut vertices, &mut midpoints, model, v1, v2);
            let m23 = midpoint(&mut vertices, &mut midpoints, model, v2, v3);
            let m31 = midpoint(&mut vertices, &mut midpoints, model, v3, v1);

            write.push([v1, m12, m31]);
            write.push([m12, v2, m23]);
            write.push([m23, v3, m31]);
            write.push([m12, m23, m31]);
        }

        std::mem::swap(&mut read, &mut write);
        trace!(
            "fragment: level {} -> {} vertices, {} triangles",
            level + 1,
            vertices.len(),
            read.len()
        );
    }

    debug!(
        "fragment: depth {} produced {} vertices, {} triangles",
        depth,
        vertices.len(),
        read.len()
    );

    MeshBuffer {
        vertices,
        triangles: read,
    }
}

/// Index of the midpoint of edge `a`-`b`, created on first request.
fn midpoint<M: HeightModel>(
    vertices: &mut Vec<Vec3>,
    midpoints: &mut HashMap<(u32, u32), u32>,
    model: &M,
    a: u32,
    b: u32,
) -> u32 {
    let key = (a.min(b), a.max(b));
    *midpoints.entry(key).or_insert_with(|| {
        let index = vertices.len() as u32;
        let position = model.midpoint(vertices[key.0 as usize], vertices[key.1 as usize]);
        vertices.push(position);
        index
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeGenerator;
    use geometry::{Planar, Radial};
    use terrace_config::ShapeKind;

    fn base(kind: ShapeKind, radius: f32) -> MeshBuffer {
        ShapeGenerator::new(kind, radius).unwrap().generate().unwrap()
    }

    #[test]
    fn test_depth_zero_is_identity() {
        let mesh = base(ShapeKind::Square, 1.0);
        assert_eq!(fragment(mesh.clone(), 0, &Planar), mesh);
    }

    #[test]
    fn test_counts_match_closed_form() {
        for kind in [
            ShapeKind::Triangle,
            ShapeKind::Square,
            ShapeKind::Polygon { sides: 6 },
            ShapeKind::Icosahedron,
        ] {
            let mesh = base(kind, 1.0);
            let counts = mesh.counts();
            for depth in 1..=3 {
                let expected = counts.subdivided(depth).unwrap();
                let fragmented = fragment(mesh.clone(), depth, &Planar);
                assert!(fragmented.validate().is_ok());
                assert_eq!(
                    fragmented.counts(),
                    expected,
                    "{:?} at depth {}",
                    kind,
                    depth
                );
            }
        }
    }

    fn sorted_positions(mesh: &MeshBuffer) -> Vec<[u32; 3]> {
        let mut keys: Vec<[u32; 3]> = mesh
            .vertices
            .iter()
            .map(|v| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
            .collect();
        keys.sort_unstable();
        keys
    }

    fn assert_passes_compose<M: HeightModel>(kind: ShapeKind, model: &M) {
        let mesh = base(kind, 3.0);
        let twice = fragment(fragment(mesh.clone(), 1, model), 1, model);
        let once = fragment(mesh, 2, model);

        assert_eq!(twice.triangle_count(), once.triangle_count());
        assert_eq!(twice.vertex_count(), once.vertex_count());
        assert_eq!(sorted_positions(&twice), sorted_positions(&once), "{:?}", kind);
    }

    #[test]
    fn test_two_passes_equal_depth_two() {
        assert_passes_compose(ShapeKind::Polygon { sides: 7 }, &Planar);
        assert_passes_compose(ShapeKind::Square, &Planar);
        assert_passes_compose(ShapeKind::Icosahedron, &Radial);
    }

    #[test]
    fn test_shared_edges_share_midpoints() {
        // Two triangles share the 0-2 diagonal: 4 corners plus 5 edge midpoints
        let fragmented = fragment(base(ShapeKind::Square, 1.0), 1, &Planar);
        assert_eq!(fragmented.vertex_count(), 9);
        assert_eq!(fragmented.triangle_count(), 8);
    }

    #[test]
    fn test_planar_winding_preserved() {
        let fragmented = fragment(base(ShapeKind::Polygon { sides: 5 }, 2.0), 3, &Planar);
        for i in 0..fragmented.triangle_count() {
            let [a, b, c] = fragmented.triangle_positions(i);
            assert!((b - a).cross(c - a).y > 0.0, "triangle {} flipped", i);
        }
    }

    #[test]
    fn test_radial_stays_on_sphere() {
        let fragmented = fragment(base(ShapeKind::Icosahedron, 4.0), 3, &Radial);
        for v in &fragmented.vertices {
            assert!((v.length() - 4.0).abs() < 1e-4, "vertex radius {}", v.length());
        }
        for i in 0..fragmented.triangle_count() {
            let [a, b, c] = fragmented.triangle_positions(i);
            let centroid = (a + b + c) / 3.0;
            assert!((b - a).cross(c - a).dot(centroid) > 0.0);
        }
    }
}
