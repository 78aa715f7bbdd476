/// Largest vertex count that still fits 16-bit indices.
pub const MAX_U16_VERTICES: usize = u16::MAX as usize;

/// Corner capacity of a slicing polygon.
///
/// A triangle clipped above one plane keeps at most 4 corners, and the band
/// between two planes has at most 5.
pub const POLYGON_CAPACITY: usize = 5;

/// A triangle is degenerate when its squared cross product is at most this
/// fraction of its longest squared edge, squared. Scale-free, so meshes of any
/// radius keep their slivers alike.
pub const DEGENERATE_RELATIVE_EPSILON: f32 = 1e-12;
