//! Deterministic procedural terrain: seeded simplex noise, fractal height
//! fields, biome colour banding, tile addressing, and structure flattening.

mod cache;
mod export;
mod field;
mod heightmap;
mod noise;
mod seed;
mod tile;

pub mod biome;
pub mod structure;

pub use biome::{
    BiomeId, BiomeKind, BiomeProfile, BiomeRegistry, BiomeRegistryError, ColorStops, Rgb,
    Thresholds, color_for,
};
pub use cache::{FieldCache, FieldKey};
pub use export::{ExportError, StructureLayerExport};
pub use field::{
    FieldError, FieldParams, TerrainField, TerrainSample, generate_field, generate_neighborhood,
    hash_field,
};
pub use heightmap::{HeightmapParams, HeightmapSampler, fractal_noise};
pub use noise::{PermutationTable, SimplexNoise};
pub use seed::{Seed, SeededRng, det_floor, det_sqrt, hash_number, hash_str};
pub use structure::{
    MaskCell, MaskGrid, PlacementOutcome, StructureDimensions, StructureKind, StructureLayer,
    StructureMask, StructurePlacement, flatten,
};
pub use tile::{NEIGHBORHOOD, TILE_SEED_LEN, TileCoord, TileNeighbor, neighborhood_seeds, tile_seed};
