//! Configuration loading and typed config structures for the Trophic
//! simulation.
//!
//! The canonical configuration lives in `trophic-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//!
//! Configuration is fixed at deploy time: it is loaded once at startup and
//! never mutated by callers afterwards.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but carries an out-of-range value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is out of range.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `trophic-config.yaml`. All sections have
/// defaults; an absent file yields the default configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, grid size, energy ceiling).
    #[serde(default)]
    pub world: WorldConfig,

    /// Plant behavior parameters.
    #[serde(default)]
    pub plant: PlantConfig,

    /// Herbivore behavior parameters.
    #[serde(default = "default_herbivore")]
    pub herbivore: SpeciesConfig,

    /// Carnivore behavior parameters.
    #[serde(default = "default_carnivore")]
    pub carnivore: SpeciesConfig,

    /// HTTP server bind settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            plant: PlantConfig::default(),
            herbivore: default_herbivore(),
            carnivore: default_carnivore(),
            server: ServerConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every probability and structural bound.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.grid_size == 0 {
            return Err(ConfigError::Invalid {
                reason: String::from("world.grid_size must be at least 1"),
            });
        }
        if self.world.max_energy <= 0 {
            return Err(ConfigError::Invalid {
                reason: String::from("world.max_energy must be positive"),
            });
        }

        let probabilities = [
            ("plant.reproduce_probability", self.plant.reproduce_probability),
            ("herbivore.move_probability", self.herbivore.move_probability),
            ("herbivore.eat_probability", self.herbivore.eat_probability),
            (
                "herbivore.reproduce_probability",
                self.herbivore.reproduce_probability,
            ),
            ("carnivore.move_probability", self.carnivore.move_probability),
            ("carnivore.eat_probability", self.carnivore.eat_probability),
            (
                "carnivore.reproduce_probability",
                self.carnivore.reproduce_probability,
            ),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must lie in [0, 1], got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for the shared generator, drawn once at startup.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Side length N of the N×N grid.
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,

    /// Upper bound on any animal's energy.
    #[serde(default = "default_max_energy")]
    pub max_energy: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            grid_size: default_grid_size(),
            max_energy: default_max_energy(),
        }
    }
}

/// Plant behavior configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlantConfig {
    /// Ticks a plant lives; once its age reaches this bound it is removed
    /// on the next sweep regardless of anything else.
    #[serde(default = "default_plant_max_age")]
    pub max_age: u32,

    /// Per-tick chance of spreading into an adjacent empty cell.
    #[serde(default = "default_plant_reproduce_probability")]
    pub reproduce_probability: f64,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            max_age: default_plant_max_age(),
            reproduce_probability: default_plant_reproduce_probability(),
        }
    }
}

/// Behavior parameters shared by both animal species.
///
/// Herbivores and carnivores follow the same three-phase tick structure
/// (move, eat, reproduce); only the constants and the prey kind differ, so
/// one struct serves both sections of the YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpeciesConfig {
    /// Energy a newly placed or newborn animal starts with.
    pub initial_energy: i32,

    /// Per-tick chance of relocating to an adjacent empty cell.
    pub move_probability: f64,

    /// Per-tick chance of consuming an adjacent prey cell.
    pub eat_probability: f64,

    /// Per-tick chance of spawning offspring (given enough energy).
    pub reproduce_probability: f64,

    /// Energy gained from one meal, capped at `world.max_energy`.
    pub eat_gain: i32,

    /// Energy spent on a successful relocation.
    pub move_cost: i32,

    /// Energy deducted from the parent on reproduction.
    pub reproduce_cost: i32,

    /// Reproduction requires energy strictly above this bound.
    pub reproduce_threshold: i32,
}

/// HTTP server bind configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_world_name() -> String {
    String::from("trophic")
}

const fn default_seed() -> u64 {
    42
}

const fn default_grid_size() -> u32 {
    15
}

const fn default_max_energy() -> i32 {
    200
}

const fn default_plant_max_age() -> u32 {
    10
}

const fn default_plant_reproduce_probability() -> f64 {
    0.2
}

const fn default_herbivore() -> SpeciesConfig {
    SpeciesConfig {
        initial_energy: 100,
        move_probability: 0.7,
        eat_probability: 0.9,
        reproduce_probability: 0.075,
        eat_gain: 30,
        move_cost: 5,
        reproduce_cost: 10,
        reproduce_threshold: 20,
    }
}

const fn default_carnivore() -> SpeciesConfig {
    SpeciesConfig {
        initial_energy: 100,
        move_probability: 0.5,
        eat_probability: 1.0,
        reproduce_probability: 0.025,
        eat_gain: 20,
        move_cost: 5,
        reproduce_cost: 10,
        reproduce_threshold: 20,
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}
