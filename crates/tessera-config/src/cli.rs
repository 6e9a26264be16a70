//! Command-line arguments for the `tessera` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Tessera terrain generator.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "tessera", about = "Seeded, seamless terrain tile generator")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<String>,

    /// Biome name (grassland, desert, tundra, volcanic, alien, canyon).
    #[arg(long)]
    pub biome: Option<String>,

    /// Quads per tile side.
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Tile X coordinate.
    #[arg(long, allow_hyphen_values = true)]
    pub tile_x: Option<i32>,

    /// Tile Z coordinate.
    #[arg(long, allow_hyphen_values = true)]
    pub tile_z: Option<i32>,

    /// Also generate the eight surrounding tiles.
    #[arg(long)]
    pub neighbors: Option<bool>,

    /// Structure export to load onto the home tile.
    #[arg(long)]
    pub structures: Option<PathBuf>,

    /// Output directory.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref seed) = args.seed {
            self.world.seed = seed.clone();
        }
        if let Some(ref biome) = args.biome {
            self.world.biome = biome.clone();
        }
        if let Some(resolution) = args.resolution {
            self.world.resolution = resolution;
        }
        if let Some(x) = args.tile_x {
            self.world.tile_x = x;
        }
        if let Some(z) = args.tile_z {
            self.world.tile_z = z;
        }
        if let Some(neighbors) = args.neighbors {
            self.world.generate_neighbors = neighbors;
        }
        if let Some(ref out) = args.out {
            self.output.directory = out.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some("abc".to_string()),
            tile_x: Some(-2),
            neighbors: Some(true),
            out: Some(PathBuf::from("out")),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.world.seed, "abc");
        assert_eq!(config.world.tile_x, -2);
        assert!(config.world.generate_neighbors);
        assert_eq!(config.output.directory, PathBuf::from("out"));
        // Non-overridden fields retain defaults
        assert_eq!(config.world.biome, "grassland");
        assert_eq!(config.world.tile_z, 0);
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_args() {
        let args = CliArgs::try_parse_from([
            "tessera",
            "--seed",
            "abc",
            "--biome",
            "canyon",
            "--tile-x",
            "-1",
            "--tile-z",
            "3",
            "--neighbors",
            "true",
            "--structures",
            "saved.json",
        ])
        .unwrap();
        assert_eq!(args.seed.as_deref(), Some("abc"));
        assert_eq!(args.biome.as_deref(), Some("canyon"));
        assert_eq!(args.tile_x, Some(-1));
        assert_eq!(args.tile_z, Some(3));
        assert_eq!(args.neighbors, Some(true));
        assert_eq!(args.structures, Some(PathBuf::from("saved.json")));
        assert!(args.config.is_none());
    }
}
