use crate::constants::POLYGON_CAPACITY;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("Element counts overflow 32-bit indices at subdivision depth {depth}")]
    CountOverflow { depth: u32 },
    #[error("Index list of length {0} is not a whole number of triangles")]
    PartialTriangle(usize),
    #[error("Slicing polygon exceeded {} corners", POLYGON_CAPACITY)]
    PolygonOverflow,
}

/// Check that every index refers to an existing vertex and that the list
/// holds whole triangles.
pub fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<(), MeshError> {
    if indices.len() % 3 != 0 {
        return Err(MeshError::PartialTriangle(indices.len()));
    }

    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| index as usize >= vertex_count)
    {
        return Err(MeshError::IndexOutOfRange {
            position,
            index,
            vertex_count,
        });
    }

    Ok(())
}
