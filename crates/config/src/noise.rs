//! Multi-octave noise settings for the sculpting stage.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, HeightCurve};

/// How accumulated octave noise is brought into [0, 1] before the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Divide by the largest value observed on this mesh.
    ///
    /// The same seed normalizes differently at different subdivision depths,
    /// because the observed maximum depends on which points were sampled.
    #[default]
    ObservedMax,
    /// Divide by the sum of octave amplitudes (the largest possible value).
    ///
    /// Independent of mesh resolution, at the cost of rarely reaching the
    /// full height range.
    AmplitudeSum,
}

/// Configuration for multi-octave value noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Random seed for reproducible generation. `None` draws fresh entropy
    /// at the start of each run.
    pub seed: Option<u64>,
    /// Base frequency of the first octave.
    pub frequency: f32,
    /// Number of noise octaves.
    pub octaves: u32,
    /// Amplitude multiplier per octave.
    pub persistence: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Height-response curve. `None` leaves heights proportional to the
    /// normalized noise.
    pub curve: Option<HeightCurve>,
    /// Normalization strategy for accumulated noise.
    pub normalization: Normalization,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: None,
            frequency: 0.15,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            curve: None,
            normalization: Normalization::ObservedMax,
        }
    }
}

impl NoiseSettings {
    /// Default settings with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Amplitude of each octave, starting at 1.0.
    pub fn amplitudes(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.octaves).scan(1.0f32, |amplitude, _| {
            let current = *amplitude;
            *amplitude *= self.persistence;
            Some(current)
        })
    }

    /// Frequency of each octave, starting at the base frequency.
    pub fn frequencies(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.octaves).scan(self.frequency, |frequency, _| {
            let current = *frequency;
            *frequency *= self.lacunarity;
            Some(current)
        })
    }

    /// Largest value the accumulated noise can reach.
    pub fn amplitude_sum(&self) -> f32 {
        self.amplitudes().sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(ConfigError::InvalidFrequency(self.frequency));
        }
        if self.octaves == 0 {
            return Err(ConfigError::InvalidOctaves);
        }

        // Persistence and lacunarity only matter once a second octave exists
        if self.octaves > 1 {
            if !(self.persistence > 0.0 && self.persistence < 1.0) {
                return Err(ConfigError::InvalidPersistence(self.persistence));
            }
            if !self.lacunarity.is_finite() || self.lacunarity <= 1.0 {
                return Err(ConfigError::InvalidLacunarity(self.lacunarity));
            }
        }

        if let Some(curve) = &self.curve {
            curve.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        let settings = NoiseSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.seed.is_none());
    }

    #[test]
    fn test_octave_series() {
        let settings = NoiseSettings {
            octaves: 3,
            frequency: 2.0,
            persistence: 0.5,
            lacunarity: 3.0,
            ..Default::default()
        };

        let amplitudes: Vec<f32> = settings.amplitudes().collect();
        let frequencies: Vec<f32> = settings.frequencies().collect();
        assert_eq!(amplitudes, vec![1.0, 0.5, 0.25]);
        assert_eq!(frequencies, vec![2.0, 6.0, 18.0]);
        assert_eq!(settings.amplitude_sum(), 1.75);
    }

    #[test]
    fn test_rejects_bad_frequency_and_octaves() {
        let settings = NoiseSettings {
            frequency: 0.0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidFrequency(_))));

        let settings = NoiseSettings {
            octaves: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidOctaves)));
    }

    #[test]
    fn test_persistence_and_lacunarity_only_checked_with_multiple_octaves() {
        let single = NoiseSettings {
            octaves: 1,
            persistence: 4.0,
            lacunarity: 0.5,
            ..Default::default()
        };
        assert!(single.validate().is_ok());

        let multi = NoiseSettings {
            octaves: 2,
            persistence: 1.0,
            ..Default::default()
        };
        assert!(matches!(multi.validate(), Err(ConfigError::InvalidPersistence(_))));

        let multi = NoiseSettings {
            octaves: 2,
            lacunarity: 1.0,
            ..Default::default()
        };
        assert!(matches!(multi.validate(), Err(ConfigError::InvalidLacunarity(_))));
    }
}
