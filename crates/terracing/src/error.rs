use geometry::MeshError;
use terrace_config::ConfigError;
use thiserror::Error;

use crate::pipeline::Stage;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),
    #[error("No generator for a {sides}-sided polygon")]
    UnsupportedShape { sides: u8 },
    #[error("Generation cancelled during {stage}")]
    Cancelled { stage: Stage },
    #[error("Invalid terracer state: {0}")]
    InvalidState(&'static str),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
    #[error("Generation worker failed: {0}")]
    Worker(String),
}

impl TerrainError {
    /// Whether this run stopped because it was cancelled rather than failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TerrainError::Cancelled { .. })
    }
}
