/*
 * Simulation Configuration Module
 *
 * This module defines the FlockConfig struct that contains all the adjustable
 * parameters for the flocking simulation, the RuleModules toggle set, and the
 * validation applied at construction time. Configurations can be built in
 * code or loaded from a TOML file.
 */

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors produced while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{name} must be a positive finite value, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} must be a non-negative finite value, got {value}")]
    Negative { name: &'static str, value: f32 },
}

/// Enable flags for the three steering rules. A closed set of named booleans,
/// not an open map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleModules {
    pub alignment: bool,
    pub cohesion: bool,
    pub separation: bool,
}

impl Default for RuleModules {
    fn default() -> Self {
        Self {
            alignment: true,
            cohesion: true,
            separation: true,
        }
    }
}

impl RuleModules {
    /// All rules disabled; agents fly in straight lines.
    pub fn none() -> Self {
        Self {
            alignment: false,
            cohesion: false,
            separation: false,
        }
    }

    /// Enable exactly one rule by name. Handy for tests and demos.
    pub fn only_alignment() -> Self {
        Self {
            alignment: true,
            ..Self::none()
        }
    }

    pub fn only_cohesion() -> Self {
        Self {
            cohesion: true,
            ..Self::none()
        }
    }

    pub fn only_separation() -> Self {
        Self {
            separation: true,
            ..Self::none()
        }
    }
}

/// Parameters for the simulation. Owned by the FlockSimulation; never ambient
/// globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    /// Number of agents. Agents are re-created wholesale when this changes.
    pub num_boids: usize,
    /// Neighbor-detection distance for the alignment rule.
    pub alignment_radius: f32,
    /// Neighbor-detection distance for the cohesion rule.
    pub cohesion_radius: f32,
    /// Neighbor-detection distance for the separation rule.
    pub separation_radius: f32,
    /// Maximum speed; velocity magnitude is clamped to this after every tick.
    pub speed_factor: f32,
    /// Agents farther than this from the origin are re-seeded inside the bound.
    pub bounds_radius: f32,
    /// Which steering rules are active.
    pub modules: RuleModules,
    /// Magnitude of the steering contribution toward an external attraction
    /// point, when one is set.
    pub attractor_strength: f32,
    // Performance settings
    pub enable_spatial_grid: bool,
    pub enable_parallel: bool,
    /// Multiplier for grid cell size relative to the largest rule radius.
    pub cell_size_factor: f32,
    /// Seed for the simulation RNG. None seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            num_boids: 500,
            alignment_radius: 50.0,
            cohesion_radius: 50.0,
            separation_radius: 25.0,
            speed_factor: 4.0,
            bounds_radius: 500.0,
            modules: RuleModules::default(),
            attractor_strength: 0.5,
            enable_spatial_grid: false,
            enable_parallel: false,
            cell_size_factor: 1.0,
            seed: None,
        }
    }
}

impl FlockConfig {
    /// Loads a configuration from a TOML file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let config_str = std::fs::read_to_string(path_ref).map_err(|e| ConfigError::Io {
            path: path_ref.display().to_string(),
            source: e,
        })?;
        let config: FlockConfig = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects degenerate parameter values before they can produce NaNs in
    /// the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("speed_factor", self.speed_factor)?;
        positive("alignment_radius", self.alignment_radius)?;
        positive("cohesion_radius", self.cohesion_radius)?;
        positive("separation_radius", self.separation_radius)?;
        positive("bounds_radius", self.bounds_radius)?;
        positive("cell_size_factor", self.cell_size_factor)?;
        non_negative("attractor_strength", self.attractor_strength)?;
        Ok(())
    }

    /// The largest of the three rule radii; the distance a spatial-grid
    /// neighbor query has to cover.
    pub fn max_rule_radius(&self) -> f32 {
        self.alignment_radius
            .max(self.cohesion_radius)
            .max(self.separation_radius)
    }

    /// Grid cell edge length, derived from the largest rule radius.
    pub fn grid_cell_size(&self) -> f32 {
        self.max_rule_radius() * self.cell_size_factor
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(FlockConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_speed() {
        let mut config = FlockConfig::default();
        config.speed_factor = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                name: "speed_factor",
                ..
            })
        ));
        config.speed_factor = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_radius_and_nan() {
        let mut config = FlockConfig::default();
        config.cohesion_radius = -10.0;
        assert!(config.validate().is_err());

        let mut config = FlockConfig::default();
        config.separation_radius = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_attractor_strength() {
        let mut config = FlockConfig::default();
        config.attractor_strength = -0.1;
        assert!(config.validate().is_err());
        config.attractor_strength = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: FlockConfig = toml::from_str(
            r#"
            num_boids = 42
            speed_factor = 2.5

            [modules]
            cohesion = false
            "#,
        )
        .unwrap();
        assert_eq!(config.num_boids, 42);
        assert_eq!(config.speed_factor, 2.5);
        assert!(config.modules.alignment);
        assert!(!config.modules.cohesion);
        assert_eq!(config.bounds_radius, FlockConfig::default().bounds_radius);
    }

    #[test]
    fn grid_cell_size_tracks_largest_radius() {
        let mut config = FlockConfig::default();
        config.alignment_radius = 10.0;
        config.cohesion_radius = 80.0;
        config.separation_radius = 20.0;
        config.cell_size_factor = 0.5;
        assert_eq!(config.grid_cell_size(), 40.0);
    }
}
