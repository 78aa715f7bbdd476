//! The plane sweep that turns one sloped triangle into floors and walls.

use geometry::{Cut, HeightModel, Polygon, Triangle};
use tracing::error;

use super::buffer::GeometryBuffer;
use crate::error::TerrainError;

/// Terrace heights padded with a sentinel plane below and above.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneSweep {
    planes: Vec<f32>,
}

impl PlaneSweep {
    /// Sweep table for `terraces` (ascending, non-empty) over a mesh whose
    /// heights span `lowest..=highest`.
    pub fn new(terraces: &[f32], lowest: f32, highest: f32) -> Self {
        let first = terraces.first().copied().unwrap_or(lowest);
        let last = terraces.last().copied().unwrap_or(highest);

        let mut planes = Vec::with_capacity(terraces.len() + 2);
        planes.push(lowest.min(first));
        planes.extend_from_slice(terraces);
        planes.push(highest.max(last));
        Self { planes }
    }

    pub fn planes(&self) -> &[f32] {
        &self.planes
    }

    pub fn terrace_count(&self) -> usize {
        self.planes.len() - 2
    }

    /// Slice one triangle into terrace floors and walls.
    ///
    /// Planes are visited lowest first. Until the first crossing the whole
    /// triangle is pending; after it, only the remainder above the last cut
    /// is. Each crossing emits the part below it as a floor at the previous
    /// plane and a wall quad along the cut. The last plane always closes the
    /// pending piece as a floor.
    pub fn slice<M: HeightModel>(
        &self,
        triangle: Triangle,
        model: &M,
        floors: &mut GeometryBuffer,
        walls: &mut GeometryBuffer,
    ) -> Result<(), TerrainError> {
        let last = self.planes.len() - 1;
        let mut previous = self.planes[0];
        let mut previous_index: usize = 0;
        let mut remainder: Option<Polygon> = None;

        for (j, &plane) in self.planes.iter().enumerate().skip(1) {
            if plane <= previous && j != last {
                continue;
            }

            let emitted = remainder.is_some();
            let (above, piece) = match remainder {
                Some(polygon) => (polygon.count_above(plane), polygon),
                None => {
                    let classified = triangle.classify(plane);
                    (classified.above, Polygon::from(classified.triangle))
                }
            };
            let above = if j == last { 0 } else { above };
            // Floors between sweep planes k and k + 1 belong to terrace k - 1;
            // the band under the first terrace joins terrace 0
            let floor_terrace = previous_index.saturating_sub(1);

            match (above, emitted) {
                (0, _) => {
                    emit_floor(&piece, previous, floor_terrace, model, floors)?;
                    return Ok(());
                }
                (n, false) if n == piece.len() => {}
                (n, _) if n < piece.len() => {
                    let split = piece.split(plane, model)?;
                    let Some(cut) = split.cut else {
                        return Err(invariant(format!(
                            "plane {} crossed a piece without cutting it",
                            plane
                        )));
                    };
                    emit_floor(&split.below, previous, floor_terrace, model, floors)?;
                    emit_wall(cut, previous, plane, j - 1, model, walls)?;
                    remainder = Some(split.above);
                }
                (n, _) => {
                    return Err(invariant(format!(
                        "{} of {} corners above plane {} after a cut",
                        n,
                        piece.len(),
                        plane
                    )));
                }
            }

            previous = plane;
            previous_index = j;
        }

        Err(invariant("sweep ended without closing the triangle".to_string()))
    }
}

fn invariant(message: String) -> TerrainError {
    error!("slice: {}", message);
    TerrainError::Invariant(message)
}

/// Fan-triangulate `polygon` flattened to `height`.
fn emit_floor<M: HeightModel>(
    polygon: &Polygon,
    height: f32,
    terrace: usize,
    model: &M,
    floors: &mut GeometryBuffer,
) -> Result<(), TerrainError> {
    for corners in polygon.fan() {
        floors.add_triangle(terrace, corners.map(|c| model.with_height(c.position, height)))?;
    }
    Ok(())
}

/// Vertical quad along `cut` from `low` up to `high`, facing the lower side.
fn emit_wall<M: HeightModel>(
    cut: Cut,
    low: f32,
    high: f32,
    terrace: usize,
    model: &M,
    walls: &mut GeometryBuffer,
) -> Result<(), TerrainError> {
    // The below piece runs enter -> exit along the cut, so a quad wound
    // exit, enter, enter-top faces into it
    let from = cut.enter.position;
    let to = cut.exit.position;
    if from == to {
        return Ok(());
    }

    let bottom_to = model.with_height(to, low);
    let bottom_from = model.with_height(from, low);
    let top_from = model.with_height(from, high);
    let top_to = model.with_height(to, high);

    walls.add_triangle(terrace, [bottom_to, bottom_from, top_from])?;
    walls.add_triangle(terrace, [bottom_to, top_from, top_to])?;
    Ok(())
}
