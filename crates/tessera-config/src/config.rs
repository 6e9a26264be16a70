//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// What to generate.
    pub world: WorldConfig,
    /// Structure grid and flattening.
    pub mask: MaskConfig,
    /// Where results go.
    pub output: OutputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World and tile selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Base world seed.
    pub seed: String,
    /// Biome name; unknown names fall back to grassland.
    pub biome: String,
    /// Quads per tile side.
    pub resolution: u32,
    /// Tile edge length in world units.
    pub tile_size: f64,
    /// Tile to generate.
    pub tile_x: i32,
    pub tile_z: i32,
    /// Also generate the eight surrounding tiles.
    pub generate_neighbors: bool,
}

/// Structure grid settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaskConfig {
    /// Cells per side.
    pub grid_size: u32,
    /// World units per cell.
    pub cell_size: f64,
    /// Normalized height structures are flattened toward.
    pub flatten_target: f64,
}

/// Output files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated files. Relative paths resolve against the
    /// working directory.
    pub directory: PathBuf,
    /// Write `field_<x>_<z>.json` for every generated tile.
    pub write_field: bool,
    /// Write `structures.json`.
    pub write_export: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "tessera_terrain=trace").
    pub log_level: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: "tessera".to_string(),
            biome: "grassland".to_string(),
            resolution: 64,
            tile_size: 100.0,
            tile_x: 0,
            tile_z: 0,
            generate_neighbors: false,
        }
    }
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            cell_size: 10.0,
            flatten_target: 0.0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("tessera-out"),
            write_field: true,
            write_export: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for Tessera (`<config_dir>/tessera`), if the
/// platform has one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tessera"))
}

// --- Validation ---

impl Config {
    /// Reject values that would make generation fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> Result<(), ConfigError> {
            Err(ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            })
        }

        if self.world.resolution == 0 {
            return invalid("world.resolution", "must be at least 1");
        }
        if !(self.world.tile_size.is_finite() && self.world.tile_size > 0.0) {
            return invalid("world.tile_size", "must be finite and positive");
        }
        if self.mask.grid_size == 0 {
            return invalid("mask.grid_size", "must be at least 1");
        }
        if !(self.mask.cell_size.is_finite() && self.mask.cell_size > 0.0) {
            return invalid("mask.cell_size", "must be finite and positive");
        }
        if !(-1.0..=1.0).contains(&self.mask.flatten_target) {
            return invalid("mask.flatten_target", "must lie in [-1, 1]");
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized)
            .map_err(ConfigError::WriteError)?;
        log::debug!("Saved config to {}", config_dir.display());
        Ok(())
    }

    /// Re-read `config.ron`: `Some(new_config)` if it differs from `self`,
    /// `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
