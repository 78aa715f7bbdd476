//! Generation pipeline orchestration.
//!
//! This module coordinates the complete generation workflow:
//! 1. Shape → base mesh
//! 2. Fragment → uniform subdivision
//! 3. Sculpt → noise heights
//! 4. Terrace → floors and walls
//! 5. Bake → immutable output buffer
//!
//! Cancellation is checked at every stage boundary and periodically inside
//! the terrace stage.

use std::fmt;
use std::future::Future;

use geometry::{BakedMesh, HeightModel, IndexFormat, Planar, Radial};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use terrace_config::{ConfigError, Surface, TerrainConfig};
use tracing::{debug, info, trace};

use crate::cancel::{CancelSignal, CancelToken};
use crate::error::TerrainError;
use crate::fragment::fragment;
use crate::noise::ValueNoise;
use crate::sculpt::Sculptor;
use crate::shape::ShapeGenerator;
use crate::terracer::Terracer;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Shape,
    Fragment,
    Sculpt,
    Terrace,
    Bake,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Shape,
        Stage::Fragment,
        Stage::Sculpt,
        Stage::Terrace,
        Stage::Bake,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Shape => "shape",
            Stage::Fragment => "fragment",
            Stage::Sculpt => "sculpt",
            Stage::Terrace => "terrace",
            Stage::Bake => "bake",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counts gathered across one run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationStats {
    /// Seed the run used, explicit or drawn.
    pub seed: u64,
    pub surface: Surface,
    pub base_vertices: usize,
    pub base_triangles: usize,
    pub fragment_vertices: usize,
    pub fragment_triangles: usize,
    /// Largest accumulated noise value before normalization.
    pub observed_max: f32,
    pub floor_triangles: usize,
    pub wall_triangles: usize,
    pub baked_vertices: usize,
    pub terraces: usize,
    pub index_format: IndexFormat,
}

/// The configured seed, or fresh OS entropy drawn now.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let seed = OsRng.next_u64();
        info!("resolve_seed: no seed configured, drew {}", seed);
        seed
    })
}

/// Run the whole pipeline for `config` on the calling thread.
pub fn run_pipeline(config: &TerrainConfig, cancel: &CancelSignal) -> Result<BakedMesh, TerrainError> {
    run_pipeline_with_stats(config, cancel).map(|(mesh, _)| mesh)
}

/// [`run_pipeline`], also returning the run's [`GenerationStats`].
pub fn run_pipeline_with_stats(
    config: &TerrainConfig,
    cancel: &CancelSignal,
) -> Result<(BakedMesh, GenerationStats), TerrainError> {
    config.validate()?;

    let generator = ShapeGenerator::new(config.shape, config.radius)?;
    generator
        .base_counts()?
        .subdivided(config.depth)
        .map_err(|_| ConfigError::DepthOverflow {
            depth: config.depth,
        })?;
    let terraces = config.terrace_heights()?;
    let seed = resolve_seed(config.noise.seed);

    let surface = config.shape.surface();
    debug!(
        "run_pipeline: {} ({:?}), depth {}, {} terraces, seed {}",
        config.shape.name(),
        surface,
        config.depth,
        config.terraces.count(),
        seed
    );

    let (baked, stats) = match surface {
        Surface::Planar => run_with_model(Planar, config, &generator, terraces, seed, cancel)?,
        Surface::Radial => run_with_model(Radial, config, &generator, terraces, seed, cancel)?,
    };

    info!(
        "run_pipeline: {} vertices, {} floor and {} wall triangles in {} terraces ({:?} indices, seed {})",
        stats.baked_vertices,
        stats.floor_triangles,
        stats.wall_triangles,
        stats.terraces,
        stats.index_format,
        stats.seed
    );
    Ok((baked, stats))
}

fn run_with_model<M: HeightModel>(
    model: M,
    config: &TerrainConfig,
    generator: &ShapeGenerator,
    terraces: Vec<f32>,
    seed: u64,
    cancel: &CancelSignal,
) -> Result<(BakedMesh, GenerationStats), TerrainError> {
    cancel.check(Stage::Shape)?;
    let base = generator.generate()?;
    let (base_vertices, base_triangles) = (base.vertex_count(), base.triangle_count());

    cancel.check(Stage::Fragment)?;
    let mut mesh = fragment(base, config.depth, &model);

    cancel.check(Stage::Sculpt)?;
    let sculptor = Sculptor::new(
        model,
        ValueNoise::new(seed),
        config.noise.clone(),
        config.min_height,
        config.max_height,
    );
    let sculpt = sculptor.sculpt(&mut mesh, seed);

    cancel.check(Stage::Terrace)?;
    let mut terracer = Terracer::new(model, terraces)?;
    trace!("run_pipeline: terrace planes {:?}", terracer.terrace_heights());
    let terrace = terracer.terrace(&mesh, cancel)?;
    let (fragment_vertices, fragment_triangles) = (mesh.vertex_count(), mesh.triangle_count());
    drop(mesh);

    cancel.check(Stage::Bake)?;
    let baked = terracer.bake()?;

    let stats = GenerationStats {
        seed,
        surface: config.shape.surface(),
        base_vertices,
        base_triangles,
        fragment_vertices,
        fragment_triangles,
        observed_max: sculpt.observed_max,
        floor_triangles: terrace.floor_triangles,
        wall_triangles: terrace.wall_triangles,
        baked_vertices: baked.vertex_count(),
        terraces: baked.submesh_count(),
        index_format: baked.index_format(),
    };
    Ok((baked, stats))
}

/// Entry point for hosts. Dropping the generator cancels every run it
/// started that is still in flight.
#[derive(Debug, Default)]
pub struct TerrainGenerator {
    owner: CancelToken,
}

impl TerrainGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every run started by this generator.
    pub fn cancel_all(&self) {
        self.owner.cancel();
    }

    /// Generate inline on the calling thread.
    pub fn generate(&self, config: &TerrainConfig) -> Result<BakedMesh, TerrainError> {
        run_pipeline(config, &CancelSignal::new(self.owner.clone(), None))
    }

    /// Generate on tokio's blocking pool.
    ///
    /// The returned future owns everything it needs and may outlive the
    /// generator; dropping the generator cancels it instead. `cancel` aborts
    /// just this request. A panic in the worker resumes on the awaiting task.
    pub fn generate_async(
        &self,
        config: TerrainConfig,
        cancel: Option<CancelToken>,
    ) -> impl Future<Output = Result<BakedMesh, TerrainError>> + Send + use<> {
        let signal = CancelSignal::new(self.owner.clone(), cancel);
        async move {
            match tokio::task::spawn_blocking(move || run_pipeline(&config, &signal)).await {
                Ok(result) => result,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => Err(TerrainError::Worker(e.to_string())),
            }
        }
    }
}

impl Drop for TerrainGenerator {
    fn drop(&mut self) {
        self.owner.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrace_config::{NoiseSettings, ShapeKind, TerraceLayout};

    fn small_config(shape: ShapeKind) -> TerrainConfig {
        TerrainConfig {
            shape,
            depth: 3,
            noise: NoiseSettings::with_seed(1234),
            terraces: TerraceLayout::Even { count: 4 },
            ..Default::default()
        }
    }

    fn small_planet() -> TerrainConfig {
        TerrainConfig {
            depth: 2,
            noise: NoiseSettings::with_seed(77),
            ..TerrainConfig::planet()
        }
    }

    #[test]
    fn test_planar_pipeline() {
        let config = small_config(ShapeKind::Polygon { sides: 6 });
        let (baked, stats) = run_pipeline_with_stats(&config, &CancelSignal::never()).unwrap();

        assert_eq!(stats.seed, 1234);
        assert_eq!(stats.base_triangles, 6);
        assert_eq!(stats.fragment_triangles, 6 * 64);
        assert_eq!(baked.submesh_count(), 4);
        assert!(baked.triangle_count() > 0);
        for indices in baked.submeshes() {
            assert!(indices.iter().all(|i| (i as usize) < baked.vertex_count()));
        }
        for v in baked.vertices() {
            assert!(v.position[1] >= -1e-5 && v.position[1] <= config.max_height + 1e-5);
        }
    }

    #[test]
    fn test_radial_pipeline() {
        let config = small_planet();
        let baked = run_pipeline(&config, &CancelSignal::never()).unwrap();
        assert_eq!(baked.submesh_count(), 6);
        for v in baked.vertices() {
            let r = glam::Vec3::from_array(v.position).length();
            assert!(
                r >= config.min_height - 1e-3 && r <= config.max_height + 1e-3,
                "radius {}",
                r
            );
        }
    }

    #[test]
    fn test_same_seed_same_mesh() {
        let config = small_config(ShapeKind::Square);
        let a = run_pipeline(&config, &CancelSignal::never()).unwrap();
        let b = run_pipeline(&config, &CancelSignal::never()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_depth_overflow_rejected() {
        let config = TerrainConfig {
            depth: 40,
            ..small_config(ShapeKind::Triangle)
        };
        assert!(matches!(
            run_pipeline(&config, &CancelSignal::never()),
            Err(TerrainError::Config(ConfigError::DepthOverflow { depth: 40 }))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TerrainConfig {
            shape: ShapeKind::Polygon { sides: 12 },
            ..Default::default()
        };
        assert!(matches!(
            run_pipeline(&config, &CancelSignal::never()),
            Err(TerrainError::Config(ConfigError::SideCount { sides: 12 }))
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let result = run_pipeline(&small_config(ShapeKind::Square), &CancelSignal::from(token));
        let err = result.unwrap_err();
        assert!(err.is_cancelled());
        assert!(matches!(err, TerrainError::Cancelled { stage: Stage::Shape }));
    }

    #[test]
    fn test_generator_inline() {
        let generator = TerrainGenerator::new();
        assert!(generator.generate(&small_config(ShapeKind::Triangle)).is_ok());

        generator.cancel_all();
        assert!(generator
            .generate(&small_config(ShapeKind::Triangle))
            .unwrap_err()
            .is_cancelled());
    }

    fn projected_area(baked: &BakedMesh) -> f32 {
        let mut area = 0.0;
        for indices in baked.submeshes() {
            let flat: Vec<u32> = indices.iter().collect();
            for t in flat.chunks_exact(3) {
                let a = baked.position(t[0]).unwrap();
                let b = baked.position(t[1]).unwrap();
                let c = baked.position(t[2]).unwrap();
                area += (b - a).cross(c - a).y * 0.5;
            }
        }
        area
    }

    #[test]
    fn test_small_radius_keeps_geometry() {
        for radius in [10.0f32, 0.01] {
            let config = TerrainConfig {
                shape: ShapeKind::Polygon { sides: 6 },
                radius,
                max_height: 0.4 * radius,
                depth: 4,
                noise: NoiseSettings::with_seed(9),
                terraces: TerraceLayout::Even { count: 4 },
                ..Default::default()
            };
            let baked = run_pipeline(&config, &CancelSignal::never()).unwrap();
            assert!(baked.triangle_count() > 0, "radius {} lost every triangle", radius);

            let hexagon = 1.5 * 3.0f32.sqrt() * radius * radius;
            let ratio = projected_area(&baked) / hexagon;
            assert!(
                (ratio - 1.0).abs() < 1e-3,
                "radius {}: floor area ratio {}",
                radius,
                ratio
            );
        }
    }

    #[test]
    fn test_cancel_after_generate_keeps_result() {
        let generator = TerrainGenerator::new();
        let config = small_config(ShapeKind::Square);
        let baked = generator.generate(&config).unwrap();
        let snapshot = baked.clone();

        generator.cancel_all();
        drop(generator);

        assert_eq!(baked, snapshot);
        assert!(baked.triangle_count() > 0);
        assert!(!baked.vertex_bytes().is_empty());
    }

    #[test]
    fn test_stage_names() {
        let names: Vec<String> = Stage::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["shape", "fragment", "sculpt", "terrace", "bake"]);
    }

    #[tokio::test]
    async fn test_generate_async_matches_inline() {
        let generator = TerrainGenerator::new();
        let config = small_config(ShapeKind::Polygon { sides: 5 });

        let inline = generator.generate(&config).unwrap();
        let background = generator.generate_async(config, None).await.unwrap();
        assert_eq!(inline, background);
    }

    #[tokio::test]
    async fn test_generate_async_request_cancel() {
        let generator = TerrainGenerator::new();
        let token = CancelToken::new();
        token.cancel();

        let result = generator
            .generate_async(small_planet(), Some(token))
            .await;
        assert!(matches!(
            result,
            Err(TerrainError::Cancelled { stage: Stage::Shape })
        ));
    }

    #[tokio::test]
    async fn test_cancel_after_async_completion_keeps_result() {
        let generator = TerrainGenerator::new();
        let token = CancelToken::new();
        let config = small_config(ShapeKind::Polygon { sides: 6 });

        let baked = generator
            .generate_async(config.clone(), Some(token.clone()))
            .await
            .unwrap();
        let snapshot = baked.clone();

        token.cancel();
        generator.cancel_all();
        drop(generator);

        assert_eq!(baked, snapshot);
        assert_eq!(baked.submesh_count(), 4);
        for indices in baked.submeshes() {
            assert!(indices.iter().all(|i| (i as usize) < baked.vertex_count()));
        }
        // Same seed in a fresh generator reproduces it
        let again = TerrainGenerator::new().generate(&config).unwrap();
        assert_eq!(baked, again);
    }

    #[tokio::test]
    async fn test_dropping_generator_cancels_pending_run() {
        let generator = TerrainGenerator::new();
        let pending = generator.generate_async(small_planet(), None);
        drop(generator);

        let err = pending.await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
