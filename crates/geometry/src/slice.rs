//! Slicing primitives for cutting triangles with height planes.
//!
//! Corners carry their height so a plane test never recomputes it, and cut
//! points are stamped with the exact plane height they were placed at.

use glam::Vec3;

use crate::constants::POLYGON_CAPACITY;
use crate::model::HeightModel;
use crate::validation::MeshError;

/// A position with its cached height.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Corner {
    pub position: Vec3,
    pub height: f32,
}

impl Corner {
    pub fn new<M: HeightModel>(position: Vec3, model: &M) -> Self {
        Self {
            position,
            height: model.height_of(position),
        }
    }

    /// A corner sits above a plane when it is at or over it.
    #[inline]
    pub fn is_above(&self, plane: f32) -> bool {
        self.height >= plane
    }
}

/// Point where the edge between `a` and `b` meets `plane`.
///
/// Always interpolates from the lower corner to the higher one, so the two
/// triangles sharing an edge compute identical bits.
pub fn intersect<M: HeightModel>(a: Corner, b: Corner, plane: f32, model: &M) -> Corner {
    let (lo, hi) = if a.height <= b.height { (a, b) } else { (b, a) };

    if hi.height == plane {
        return hi;
    }
    if lo.height == plane {
        return lo;
    }

    let t = (plane - lo.height) / (hi.height - lo.height);
    Corner {
        position: model.with_height(lo.position.lerp(hi.position, t), plane),
        height: plane,
    }
}

/// Three corners in counter-clockwise order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle(pub [Corner; 3]);

/// A triangle rotated for a plane, with the number of corners above it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classified {
    pub triangle: Triangle,
    pub above: usize,
}

impl Triangle {
    pub fn from_positions<M: HeightModel>(positions: [Vec3; 3], model: &M) -> Self {
        Self(positions.map(|p| Corner::new(p, model)))
    }

    pub fn corners(&self) -> &[Corner; 3] {
        &self.0
    }

    /// Rotate left by `n` corners. Winding is preserved.
    pub fn rotated(self, n: usize) -> Self {
        let mut corners = self.0;
        corners.rotate_left(n % 3);
        Self(corners)
    }

    /// Count corners above `plane` and rotate so the odd one out leads:
    /// with one corner above, that corner comes first; with two above, the
    /// single corner below comes first.
    pub fn classify(self, plane: f32) -> Classified {
        let flags = self.0.map(|c| c.is_above(plane));
        let above = flags.iter().filter(|&&f| f).count();

        let lead = match above {
            1 => flags.iter().position(|&f| f),
            2 => flags.iter().position(|&f| !f),
            _ => None,
        };

        Classified {
            triangle: lead.map_or(self, |n| self.rotated(n)),
            above,
        }
    }
}

/// Result of cutting a polygon with a plane.
#[derive(Debug, Clone, Copy)]
pub struct Split {
    /// Part below the plane, same winding.
    pub below: Polygon,
    /// Part at or above the plane, same winding.
    pub above: Polygon,
    /// Cut segment, present when the plane crossed the polygon.
    pub cut: Option<Cut>,
}

/// The two plane intersections of a split, in the order the below part
/// traverses them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cut {
    /// Where the boundary leaves the below part.
    pub enter: Corner,
    /// Where the boundary comes back into the below part.
    pub exit: Corner,
}

/// Convex polygon of at most [`POLYGON_CAPACITY`] corners, stored inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Polygon {
    corners: [Corner; POLYGON_CAPACITY],
    len: usize,
}

impl Polygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, corner: Corner) -> Result<(), MeshError> {
        let slot = self
            .corners
            .get_mut(self.len)
            .ok_or(MeshError::PolygonOverflow)?;
        *slot = corner;
        self.len += 1;
        Ok(())
    }

    pub fn corners(&self) -> &[Corner] {
        &self.corners[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn count_above(&self, plane: f32) -> usize {
        self.corners().iter().filter(|c| c.is_above(plane)).count()
    }

    /// Fan triangles `(0, i, i + 1)`, winding preserved.
    pub fn fan(&self) -> impl Iterator<Item = [Corner; 3]> + '_ {
        let corners = self.corners();
        (1..corners.len().saturating_sub(1)).map(move |i| [corners[0], corners[i], corners[i + 1]])
    }

    /// Sutherland-Hodgman split at `plane`.
    ///
    /// Each crossing edge contributes one intersection to both halves. The
    /// below half walks the cut from `enter` to `exit`.
    pub fn split<M: HeightModel>(&self, plane: f32, model: &M) -> Result<Split, MeshError> {
        let mut below = Polygon::new();
        let mut above = Polygon::new();
        let mut enter = None;
        let mut exit = None;

        let corners = self.corners();
        for (i, &current) in corners.iter().enumerate() {
            let next = corners[(i + 1) % corners.len()];
            let current_above = current.is_above(plane);

            if current_above {
                above.push(current)?;
            } else {
                below.push(current)?;
            }

            if current_above != next.is_above(plane) {
                let crossing = intersect(current, next, plane, model);
                below.push(crossing)?;
                above.push(crossing)?;
                if current_above {
                    exit = Some(crossing);
                } else {
                    enter = Some(crossing);
                }
            }
        }

        let cut = match (enter, exit) {
            (Some(enter), Some(exit)) => Some(Cut { enter, exit }),
            _ => None,
        };

        Ok(Split { below, above, cut })
    }
}

impl From<Triangle> for Polygon {
    fn from(triangle: Triangle) -> Self {
        let mut corners = [Corner::default(); POLYGON_CAPACITY];
        corners[..3].copy_from_slice(&triangle.0);
        Self { corners, len: 3 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Planar, Radial};

    fn planar_triangle(heights: [f32; 3]) -> Triangle {
        Triangle::from_positions(
            [
                Vec3::new(0.0, heights[0], 0.0),
                Vec3::new(0.0, heights[1], 1.0),
                Vec3::new(1.0, heights[2], 0.0),
            ],
            &Planar,
        )
    }

    #[test]
    fn test_classify_counts_and_rotation() {
        let tri = planar_triangle([0.0, 5.0, 10.0]);

        let none = tri.classify(11.0);
        assert_eq!(none.above, 0);
        assert_eq!(none.triangle, tri);

        let all = tri.classify(0.0);
        assert_eq!(all.above, 3);

        // One above: the above corner leads
        let one = tri.classify(6.0);
        assert_eq!(one.above, 1);
        assert_eq!(one.triangle.0[0].height, 10.0);
        assert_eq!(one.triangle.0[1].height, 0.0);

        // Two above: the below corner leads
        let two = tri.classify(2.0);
        assert_eq!(two.above, 2);
        assert_eq!(two.triangle.0[0].height, 0.0);
        assert_eq!(two.triangle.0[1].height, 5.0);
    }

    #[test]
    fn test_plane_through_corner_counts_as_above() {
        let tri = planar_triangle([0.0, 5.0, 10.0]);
        assert_eq!(tri.classify(5.0).above, 2);
        assert_eq!(tri.classify(10.0).above, 1);
    }

    #[test]
    fn test_intersection_is_canonical() {
        let a = Corner::new(Vec3::new(0.1, 0.3, 0.7), &Planar);
        let b = Corner::new(Vec3::new(0.9, 7.1, 0.2), &Planar);
        let forward = intersect(a, b, 2.5, &Planar);
        let backward = intersect(b, a, 2.5, &Planar);
        assert_eq!(forward.position.to_array(), backward.position.to_array());
        assert_eq!(forward.height, 2.5);
        assert_eq!(forward.position.y, 2.5);
    }

    #[test]
    fn test_intersection_on_sphere() {
        let a = Corner::new(Vec3::new(9.0, 0.0, 0.0), &Radial);
        let b = Corner::new(Vec3::new(0.0, 12.0, 0.0), &Radial);
        let cut = intersect(a, b, 10.0, &Radial);
        assert!((cut.position.length() - 10.0).abs() < 1e-4);
        assert_eq!(cut.height, 10.0);
    }

    #[test]
    fn test_split_partitions_triangle() {
        let tri = planar_triangle([0.0, 5.0, 10.0]);
        let split = Polygon::from(tri).split(2.0, &Planar).unwrap();

        assert_eq!(split.below.len(), 3);
        assert_eq!(split.above.len(), 4);
        let cut = split.cut.unwrap();
        assert!((cut.enter.position - Vec3::new(0.0, 2.0, 0.4)).length() < 1e-6);
        assert!((cut.exit.position - Vec3::new(0.2, 2.0, 0.0)).length() < 1e-6);

        // Projected areas add up to the whole triangle
        let area = |p: &Polygon| -> f32 {
            p.fan()
                .map(|[a, b, c]| {
                    let ab = b.position - a.position;
                    let ac = c.position - a.position;
                    (ab.z * ac.x - ab.x * ac.z) * 0.5
                })
                .sum()
        };
        let total = area(&split.below) + area(&split.above);
        assert!((total - 0.5).abs() < 1e-6, "projected area {}", total);
        assert!(area(&split.below) > 0.0);
    }

    #[test]
    fn test_split_without_crossing() {
        let tri = planar_triangle([3.0, 4.0, 5.0]);
        let split = Polygon::from(tri).split(2.0, &Planar).unwrap();
        assert!(split.below.is_empty());
        assert_eq!(split.above.len(), 3);
        assert!(split.cut.is_none());
    }

    #[test]
    fn test_polygon_capacity() {
        let mut polygon = Polygon::new();
        for _ in 0..POLYGON_CAPACITY {
            assert!(polygon.push(Corner::default()).is_ok());
        }
        assert!(matches!(
            polygon.push(Corner::default()),
            Err(MeshError::PolygonOverflow)
        ));
        assert_eq!(polygon.fan().count(), POLYGON_CAPACITY - 2);
    }
}
