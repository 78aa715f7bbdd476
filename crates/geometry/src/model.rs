//! Height models: how a vertex measures and changes its height.
//!
//! Every stage of the generator is generic over [`HeightModel`], so one
//! fragmenter, sculptor and terracer serve both flat maps and planets.

use glam::Vec3;

/// Coordinate system that defines "height" for a surface.
pub trait HeightModel: Copy + Send + Sync + 'static {
    /// Height of a point.
    fn height_of(&self, v: Vec3) -> f32;

    /// Move a point to `height`, keeping its horizontal position
    /// (planar) or its direction from the origin (radial).
    fn with_height(&self, v: Vec3, height: f32) -> Vec3;

    /// Point halfway between `a` and `b` on the surface.
    fn midpoint(&self, a: Vec3, b: Vec3) -> Vec3;

    /// Components that receive a random per-octave noise offset.
    fn offset_mask(&self) -> Vec3;

    /// Sample 2-D noise at a 3-D point.
    fn sample_noise<F>(&self, p: Vec3, noise: F) -> f32
    where
        F: Fn(f32, f32) -> f32;

    /// Height range the sculptor maps normalized noise into.
    fn height_range(&self, min_height: f32, max_height: f32) -> (f32, f32);

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Height is Y. Shapes lie on the XZ plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Planar;

impl HeightModel for Planar {
    #[inline]
    fn height_of(&self, v: Vec3) -> f32 {
        v.y
    }

    #[inline]
    fn with_height(&self, v: Vec3, height: f32) -> Vec3 {
        Vec3::new(v.x, height, v.z)
    }

    #[inline]
    fn midpoint(&self, a: Vec3, b: Vec3) -> Vec3 {
        (a + b) * 0.5
    }

    fn offset_mask(&self) -> Vec3 {
        Vec3::new(1.0, 0.0, 1.0)
    }

    fn sample_noise<F>(&self, p: Vec3, noise: F) -> f32
    where
        F: Fn(f32, f32) -> f32,
    {
        noise(p.x, p.z)
    }

    /// Planar terrain always rises from the ground plane.
    fn height_range(&self, _min_height: f32, max_height: f32) -> (f32, f32) {
        (0.0, max_height)
    }

    fn name(&self) -> &'static str {
        "planar"
    }
}

/// Height is the distance from the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Radial;

impl HeightModel for Radial {
    #[inline]
    fn height_of(&self, v: Vec3) -> f32 {
        v.length()
    }

    #[inline]
    fn with_height(&self, v: Vec3, height: f32) -> Vec3 {
        v.normalize_or_zero() * height
    }

    /// Great-circle midpoint of the directions, at the mean distance.
    ///
    /// Antipodal points have no unique midpoint and collapse to the origin.
    fn midpoint(&self, a: Vec3, b: Vec3) -> Vec3 {
        let direction = (a.normalize_or_zero() + b.normalize_or_zero()).normalize_or_zero();
        direction * ((a.length() + b.length()) * 0.5)
    }

    fn offset_mask(&self) -> Vec3 {
        Vec3::ONE
    }

    /// Average of the six axis-pair projections, so no direction on the
    /// sphere stretches the noise.
    fn sample_noise<F>(&self, p: Vec3, noise: F) -> f32
    where
        F: Fn(f32, f32) -> f32,
    {
        let sum = noise(p.x, p.y)
            + noise(p.y, p.x)
            + noise(p.x, p.z)
            + noise(p.z, p.x)
            + noise(p.y, p.z)
            + noise(p.z, p.y);
        sum / 6.0
    }

    fn height_range(&self, min_height: f32, max_height: f32) -> (f32, f32) {
        (min_height, max_height)
    }

    fn name(&self) -> &'static str {
        "radial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_height() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Planar.height_of(v), 2.0);
        assert_eq!(Planar.with_height(v, 7.0), Vec3::new(1.0, 7.0, 3.0));
        assert_eq!(
            Planar.midpoint(Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0)),
            Vec3::new(1.0, 2.0, 3.0)
        );
        assert_eq!(Planar.height_range(5.0, 10.0), (0.0, 10.0));
    }

    #[test]
    fn test_radial_height() {
        let v = Vec3::new(3.0, 0.0, 4.0);
        assert!((Radial.height_of(v) - 5.0).abs() < 1e-6);

        let moved = Radial.with_height(v, 10.0);
        assert!((moved.length() - 10.0).abs() < 1e-5);
        assert!(moved.normalize().dot(v.normalize()) > 0.9999);
        assert_eq!(Radial.height_range(5.0, 10.0), (5.0, 10.0));
    }

    #[test]
    fn test_radial_midpoint_stays_on_sphere() {
        let a = Vec3::new(2.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 2.0, 0.0);
        let mid = Radial.midpoint(a, b);
        assert!((mid.length() - 2.0).abs() < 1e-5, "midpoint radius {}", mid.length());
        assert!((mid.x - mid.y).abs() < 1e-6);

        // Mixed radii average the magnitude
        let mid = Radial.midpoint(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0));
        assert!((mid.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_noise_sampling_axes() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Planar.sample_noise(p, |x, y| x * 10.0 + y), 13.0);

        // Symmetric lookup returns the same value from all six projections
        assert_eq!(Radial.sample_noise(p, |_, _| 0.25), 0.25);
        let asymmetric = Radial.sample_noise(p, |x, _| x);
        assert!((asymmetric - 2.0).abs() < 1e-6);
    }
}
