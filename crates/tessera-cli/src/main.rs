//! `tessera`: generate a terrain tile (optionally with its neighbours) and
//! write the structure export and field dumps.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p tessera-cli -- --seed abc --neighbors true`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tessera_config::{CliArgs, Config, ConfigError, default_config_dir};
use tessera_terrain::{
    BiomeKind, ExportError, FieldCache, FieldError, FieldParams, MaskGrid, Seed,
    StructureLayer, StructureLayerExport, TerrainField, TileCoord, generate_neighborhood,
};
use tracing::{error, info, warn};

const EXPORT_FILE: &str = "structures.json";

/// Anything that stops a run.
#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What a run produced.
#[derive(Debug, Default)]
struct RunSummary {
    tiles: usize,
    structures: usize,
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from(".tessera"));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    if let Err(e) = tessera_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config))
    {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(&config, args.structures.as_deref()) {
        Ok(summary) => {
            info!(
                tiles = summary.tiles,
                structures = summary.structures,
                files = summary.files.len(),
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, structures: Option<&Path>) -> Result<RunSummary, RunError> {
    config.validate()?;

    let seed = Seed::from(config.world.seed.as_str());
    let biome = BiomeKind::from_name_or_default(&config.world.biome);
    let grid = MaskGrid::new(config.mask.grid_size, config.mask.cell_size);
    let tile = TileCoord::new(config.world.tile_x, config.world.tile_z);

    let layer = match structures {
        Some(path) => load_layer(path, &seed, grid)?,
        None => StructureLayer::new(grid),
    };
    let home_in_ring = tile.x.unsigned_abs() <= 1 && tile.z.unsigned_abs() <= 1;
    let covers_home = tile.is_home() || (config.world.generate_neighbors && home_in_ring);
    if !layer.is_empty() && !covers_home {
        warn!(%tile, "structures only flatten the home tile; ignoring them for this run");
    }
    let mask = layer.mask();

    let params = FieldParams {
        seed: seed.clone(),
        biome: biome.profile(),
        resolution: config.world.resolution,
        tile_size: config.world.tile_size,
        tile,
        flatten_target: config.mask.flatten_target,
        is_home: tile.is_home(),
    };

    info!(
        seed = %seed,
        biome = biome.name(),
        %tile,
        resolution = params.resolution,
        neighbors = config.world.generate_neighbors,
        "generating terrain"
    );

    let cache = FieldCache::new();
    let mut fields = vec![cache.get_or_generate(&params, Some(&mask))?];
    if config.world.generate_neighbors {
        // The centre is already cached; keep the cached copy.
        let ring = generate_neighborhood(&params, Some(&mask))?
            .into_iter()
            .filter(|(neighbor, _)| !neighbor.is_center())
            .map(|(_, field)| Arc::new(field));
        fields.extend(ring);
    }

    for field in &fields {
        info!(
            tile = %field.tile,
            tile_seed = %field.tile_seed,
            min = field.min_height(),
            max = field.max_height(),
            "tile ready"
        );
    }

    let mut summary = RunSummary {
        tiles: fields.len(),
        structures: layer.len(),
        ..RunSummary::default()
    };

    let out_dir = &config.output.directory;
    if config.output.write_export {
        let path = out_dir.join(EXPORT_FILE);
        StructureLayerExport::new(&seed, tile, layer.structures()).write_to(&path)?;
        summary.files.push(path);
    }
    if config.output.write_field {
        for field in &fields {
            summary.files.push(write_field(out_dir, field)?);
        }
    }

    Ok(summary)
}

/// Rebuild a structure layer from an export file.
fn load_layer(path: &Path, seed: &Seed, grid: MaskGrid) -> Result<StructureLayer, RunError> {
    let export = StructureLayerExport::read_from(path)?;
    if !export.matches_seed(seed) {
        warn!(
            path = %path.display(),
            exported = %export.base_seed,
            current = %seed,
            "structure export was built on a different seed"
        );
    }
    info!(
        path = %path.display(),
        structures = export.structures.len(),
        "loaded structures"
    );
    Ok(StructureLayer::from_placements(grid, export.structures))
}

/// Dump one field as `field_<x>_<z>.json` under `dir`.
fn write_field(dir: &Path, field: &TerrainField) -> Result<PathBuf, RunError> {
    let path = dir.join(format!("field_{}.json", field.tile.tile_id()));
    let write_err = |source| RunError::Write {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_err)?;
    let file = File::create(&path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, field).map_err(|source| RunError::Encode {
        path: path.clone(),
        source,
    })?;
    writer.flush().map_err(write_err)?;

    tracing::debug!(path = %path.display(), "wrote field");
    Ok(path)
}
