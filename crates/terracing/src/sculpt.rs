//! Noise-driven height displacement.
//!
//! Sculpting runs in two passes over the vertices. The first accumulates
//! multi-octave noise per vertex and finds the largest value; the second
//! normalizes, applies the height curve and moves each vertex to its height
//! along its own direction.

use geometry::{HeightModel, MeshBuffer};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use terrace_config::{NoiseSettings, Normalization};
use tracing::{debug, warn};

use crate::noise::Noise2D;

/// Range of the random per-octave sample offsets.
const OCTAVE_OFFSET_RANGE: f32 = 1000.0;

/// One noise layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Octave {
    pub amplitude: f32,
    pub frequency: f32,
    pub offset: Vec3,
}

/// Summary of one sculpt pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SculptStats {
    pub vertices: usize,
    /// Largest accumulated noise value before normalization.
    pub observed_max: f32,
    /// Value the accumulated noise was divided by.
    pub normalizer: f32,
}

pub struct Sculptor<M, N> {
    model: M,
    noise: N,
    settings: NoiseSettings,
    min_height: f32,
    max_height: f32,
}

impl<M: HeightModel, N: Noise2D> Sculptor<M, N> {
    pub fn new(model: M, noise: N, settings: NoiseSettings, min_height: f32, max_height: f32) -> Self {
        Self {
            model,
            noise,
            settings,
            min_height,
            max_height,
        }
    }

    /// Octave layers for `seed`. Offsets are drawn once per call, in octave
    /// order, and masked to the axes the height model samples.
    pub fn octaves(&self, seed: u64) -> Vec<Octave> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mask = self.model.offset_mask();

        self.settings
            .amplitudes()
            .zip(self.settings.frequencies())
            .map(|(amplitude, frequency)| {
                let offset = Vec3::new(
                    rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
                    rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
                    rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
                ) * mask;
                Octave {
                    amplitude,
                    frequency,
                    offset,
                }
            })
            .collect()
    }

    /// Accumulated octave noise at `p`.
    fn accumulate(&self, p: Vec3, octaves: &[Octave]) -> f32 {
        octaves
            .iter()
            .map(|octave| {
                let q = p * octave.frequency + octave.offset;
                octave.amplitude * self.model.sample_noise(q, |x, y| self.noise.sample(x, y))
            })
            .sum()
    }

    /// Displace every vertex of `mesh` to its noise height.
    pub fn sculpt(&self, mesh: &mut MeshBuffer, seed: u64) -> SculptStats {
        let octaves = self.octaves(seed);

        let values: Vec<f32> = mesh
            .vertices
            .par_iter()
            .map(|&v| self.accumulate(v, &octaves))
            .collect();
        let observed_max = values.par_iter().copied().reduce(|| 0.0, f32::max);

        let normalizer = match self.settings.normalization {
            Normalization::ObservedMax => observed_max,
            Normalization::AmplitudeSum => self.settings.amplitude_sum(),
        };
        if normalizer <= 0.0 && !values.is_empty() {
            warn!("sculpt: noise never rose above zero, flattening to the lowest height");
        }

        let (lo, hi) = self.model.height_range(self.min_height, self.max_height);
        let curve = self.settings.curve.as_ref();

        mesh.vertices
            .par_iter_mut()
            .zip(values.par_iter())
            .for_each(|(v, &value)| {
                let n = if normalizer > 0.0 {
                    (value / normalizer).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let response = curve.map_or(1.0, |c| c.evaluate(n));
                *v = self.model.with_height(*v, lo + (hi - lo) * n * response);
            });

        debug!(
            "sculpt: {} vertices, {} octaves, observed max {:.4}, {} model",
            values.len(),
            octaves.len(),
            observed_max,
            self.model.name()
        );

        SculptStats {
            vertices: values.len(),
            observed_max,
            normalizer,
        }
    }
}
