//! Terrain field builder: samples one tile's `(resolution + 1)²` vertex grid
//! of heights and colours.
//!
//! Every call builds its own RNG, permutation table and noise, keyed by the
//! base seed, so output is a pure function of the parameters and tiles can be
//! generated in any order or in parallel.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::biome::{BiomeKind, BiomeProfile, BiomeRegistryError, Rgb, color_for};
use crate::heightmap::{HeightmapParams, HeightmapSampler};
use crate::seed::Seed;
use crate::structure::{StructureMask, flatten};
use crate::tile::{NEIGHBORHOOD, TileCoord, TileNeighbor, tile_seed};

/// Errors raised for unusable field parameters.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// Resolution must be at least one quad per side.
    #[error("resolution must be at least 1")]
    ZeroResolution,

    /// Tile size must be finite and positive.
    #[error("tile size must be finite and positive, got {0}")]
    InvalidTileSize(f64),

    /// Mask cell size must be finite and positive.
    #[error("mask cell size must be finite and positive, got {0}")]
    InvalidCellSize(f64),

    /// Flatten target must lie in `[-1, 1]`.
    #[error("flatten target must lie in [-1, 1], got {0}")]
    InvalidFlattenTarget(f64),

    /// The biome profile failed validation.
    #[error(transparent)]
    Biome(#[from] BiomeRegistryError),

    /// Part of the requested neighbourhood lies beyond the `i32` tile grid.
    #[error("neighbourhood of tile {0} extends past the tile grid")]
    TileOutOfRange(TileCoord),

    /// A neighbourhood worker thread could not be started.
    #[error("failed to spawn generation worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

/// Inputs for one tile.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldParams {
    /// Base world seed. Also the noise seed for every tile.
    pub seed: Seed,
    /// Height, noise and colour parameters.
    pub biome: BiomeProfile,
    /// Quads per tile side; the vertex grid is `resolution + 1` wide.
    pub resolution: u32,
    /// Tile edge length in world units.
    pub tile_size: f64,
    /// Which tile to sample.
    pub tile: TileCoord,
    /// Normalized height structures are flattened toward.
    pub flatten_target: f64,
    /// Only the home tile receives structure masking.
    pub is_home: bool,
}

impl FieldParams {
    /// Home-tile parameters with common defaults.
    pub fn new(seed: impl Into<Seed>, biome: BiomeKind) -> Self {
        Self {
            seed: seed.into(),
            biome: biome.profile(),
            resolution: 64,
            tile_size: 100.0,
            tile: TileCoord::HOME,
            flatten_target: 0.0,
            is_home: true,
        }
    }

    /// The same parameters aimed at another tile. `is_home` follows the
    /// coordinate.
    pub fn for_tile(&self, tile: TileCoord) -> Self {
        Self {
            tile,
            is_home: tile.is_home(),
            ..self.clone()
        }
    }

    /// Check everything the builder relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldError`] found.
    pub fn validate(&self, mask: Option<&StructureMask>) -> Result<(), FieldError> {
        if self.resolution == 0 {
            return Err(FieldError::ZeroResolution);
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(FieldError::InvalidTileSize(self.tile_size));
        }
        if !(-1.0..=1.0).contains(&self.flatten_target) {
            return Err(FieldError::InvalidFlattenTarget(self.flatten_target));
        }
        if let Some(mask) = mask {
            let cell_size = mask.grid().cell_size;
            if !(cell_size.is_finite() && cell_size > 0.0) {
                return Err(FieldError::InvalidCellSize(cell_size));
            }
        }
        self.biome.validate()?;
        Ok(())
    }

    /// World coordinate of vertex `i` along one axis of tile `tile`.
    ///
    /// Computed from the integer step `tile * resolution + i` so that the
    /// last vertex of one tile and the first of the next are bit-identical.
    fn world_axis(&self, tile: i32, i: u32) -> f64 {
        let res = self.resolution;
        let step = i64::from(tile) * i64::from(res) + i64::from(i);
        (step as f64 / f64::from(res) - 0.5) * self.tile_size
    }

    /// Tile-local coordinate of vertex `i`, with the tile centre at 0.
    fn local_axis(&self, i: u32) -> f64 {
        (f64::from(i) / f64::from(self.resolution) - 0.5) * self.tile_size
    }
}

/// One vertex of a generated field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TerrainSample {
    /// Clamped noise height in `[-1, 1]`, before masking.
    pub height: f64,
    /// Height after structure flattening.
    pub final_height: f64,
    /// Banded colour of `final_height`.
    pub color: Rgb,
}

/// A generated tile: row-major samples, `z` outer and `x` inner.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TerrainField {
    pub tile: TileCoord,
    pub tile_seed: String,
    pub resolution: u32,
    pub tile_size: f64,
    pub height_scale: f64,
    pub samples: Vec<TerrainSample>,
    #[serde(skip)]
    params: FieldParams,
}

impl TerrainField {
    /// Vertices per side.
    pub fn size(&self) -> usize {
        self.resolution as usize + 1
    }

    /// Sample at vertex `(ix, iz)`, `None` outside the grid.
    pub fn get(&self, ix: usize, iz: usize) -> Option<&TerrainSample> {
        let side = self.size();
        if ix >= side || iz >= side {
            return None;
        }
        self.samples.get(iz * side + ix)
    }

    /// World-space `(x, z)` of vertex `(ix, iz)`.
    pub fn world_position(&self, ix: u32, iz: u32) -> (f64, f64) {
        (
            self.params.world_axis(self.tile.x, ix),
            self.params.world_axis(self.tile.z, iz),
        )
    }

    /// World-units elevation of vertex `(ix, iz)`.
    pub fn elevation(&self, ix: usize, iz: usize) -> Option<f64> {
        self.get(ix, iz).map(|s| s.final_height * self.height_scale)
    }

    /// Lowest post-mask height.
    pub fn min_height(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.final_height)
            .fold(f64::INFINITY, f64::min)
    }

    /// Highest post-mask height.
    pub fn max_height(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.final_height)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Parameters this field was generated from.
    pub fn params(&self) -> &FieldParams {
        &self.params
    }
}

/// Generate one tile.
///
/// `mask` is applied only when `params.is_home`; it is interpreted in
/// tile-local coordinates (tile centre at the origin).
///
/// # Errors
///
/// Returns [`FieldError`] if the parameters fail [`FieldParams::validate`].
pub fn generate_field(
    params: &FieldParams,
    mask: Option<&StructureMask>,
) -> Result<TerrainField, FieldError> {
    params.validate(mask)?;

    let _span = tracing::debug_span!(
        "generate_field",
        tile = %params.tile,
        resolution = params.resolution,
        biome = %params.biome.name
    )
    .entered();

    let sampler = HeightmapSampler::new(HeightmapParams::with_seed(params.seed.clone()));
    let mask = mask.filter(|m| params.is_home && !m.is_empty());
    let biome = &params.biome;

    let side = params.resolution + 1;
    let mut samples = Vec::with_capacity(side as usize * side as usize);
    for iz in 0..side {
        let world_z = params.world_axis(params.tile.z, iz);
        let local_z = params.local_axis(iz);
        for ix in 0..side {
            let world_x = params.world_axis(params.tile.x, ix);
            let height =
                sampler.terrain_height(world_x, world_z, biome.noise_scale, biome.octaves);

            let final_height = match mask {
                Some(mask) => {
                    let influence = mask.influence_at(params.local_axis(ix), local_z);
                    flatten(height, influence, params.flatten_target)
                }
                None => height,
            };

            samples.push(TerrainSample {
                height,
                final_height,
                color: color_for(final_height, biome),
            });
        }
    }

    let field = TerrainField {
        tile: params.tile,
        tile_seed: tile_seed(&params.seed, params.tile.x, params.tile.z),
        resolution: params.resolution,
        tile_size: params.tile_size,
        height_scale: biome.height_scale,
        samples,
        params: params.clone(),
    };

    tracing::debug!(
        tile_seed = %field.tile_seed,
        min = field.min_height(),
        max = field.max_height(),
        masked = mask.is_some(),
        "generated tile"
    );
    Ok(field)
}

/// Generate the 3×3 neighbourhood around `params.tile`, one worker per tile.
///
/// Each tile's `is_home` follows its own coordinate, so the mask lands on
/// `(0, 0)` wherever it sits in the block and nowhere else.
/// Results are in [`NEIGHBORHOOD`] order.
///
/// # Errors
///
/// Returns [`FieldError`] for invalid parameters, a neighbourhood that runs
/// off the tile grid, or a worker that cannot start.
pub fn generate_neighborhood(
    params: &FieldParams,
    mask: Option<&StructureMask>,
) -> Result<Vec<(TileNeighbor, TerrainField)>, FieldError> {
    params.validate(mask)?;

    let mut jobs = Vec::with_capacity(NEIGHBORHOOD.len());
    for neighbor in NEIGHBORHOOD {
        let tile = neighbor
            .coord(params.tile)
            .ok_or(FieldError::TileOutOfRange(params.tile))?;
        jobs.push((neighbor, params.for_tile(tile)));
    }

    std::thread::scope(|scope| -> Result<Vec<_>, FieldError> {
        let mut handles = Vec::with_capacity(jobs.len());
        for (neighbor, tile_params) in jobs {
            let handle = std::thread::Builder::new()
                .name(format!("tile-gen-{}", neighbor.label))
                .spawn_scoped(scope, move || generate_field(&tile_params, mask))
                .map_err(FieldError::WorkerSpawn)?;
            handles.push((neighbor, handle));
        }

        handles
            .into_iter()
            .map(|(neighbor, handle)| match handle.join() {
                Ok(result) => result.map(|field| (neighbor, field)),
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}

/// Hash every sample's bits for determinism comparison.
pub fn hash_field(field: &TerrainField) -> u64 {
    let mut hasher = DefaultHasher::new();
    field.tile.hash(&mut hasher);
    field.resolution.hash(&mut hasher);
    for sample in &field.samples {
        sample.height.to_bits().hash(&mut hasher);
        sample.final_height.to_bits().hash(&mut hasher);
        sample.color.r.to_bits().hash(&mut hasher);
        sample.color.g.to_bits().hash(&mut hasher);
        sample.color.b.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{MaskGrid, StructureKind, StructurePlacement};

    fn params() -> FieldParams {
        FieldParams {
            resolution: 16,
            tile_size: 32.0,
            ..FieldParams::new("abc", BiomeKind::Grassland)
        }
    }

    fn mask_with_center_structure() -> StructureMask {
        StructureMask::build(
            &[StructurePlacement::new("s", StructureKind::Tower, 4, 4)],
            MaskGrid::new(8, 4.0),
        )
    }

    #[test]
    fn test_field_dimensions() {
        let field = generate_field(&params(), None).unwrap();
        assert_eq!(field.size(), 17);
        assert_eq!(field.samples.len(), 17 * 17);
        assert!(field.get(16, 16).is_some());
        assert!(field.get(17, 0).is_none());
    }

    #[test]
    fn test_generate_same_tile_twice_identical() {
        let a = generate_field(&params(), None).unwrap();
        let b = generate_field(&params(), None).unwrap();
        assert_eq!(hash_field(&a), hash_field(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_on_different_threads_identical() {
        let p = params();
        let p2 = p.clone();
        let handle_a = std::thread::spawn(move || hash_field(&generate_field(&p, None).unwrap()));
        let handle_b = std::thread::spawn(move || hash_field(&generate_field(&p2, None).unwrap()));
        assert_eq!(handle_a.join().unwrap(), handle_b.join().unwrap());
    }

    #[test]
    fn test_heights_clamped_and_colors_normalized() {
        for kind in BiomeKind::ALL {
            let field = generate_field(
                &FieldParams {
                    biome: kind.profile(),
                    ..params()
                },
                None,
            )
            .unwrap();
            for s in &field.samples {
                assert!((-1.0..=1.0).contains(&s.height));
                assert!(s.color.is_normalized());
            }
        }
    }

    #[test]
    fn test_world_positions_span_tile() {
        let field = generate_field(&params().for_tile(TileCoord::new(2, -1)), None).unwrap();
        assert_eq!(field.world_position(0, 0), (48.0, -48.0));
        assert_eq!(field.world_position(16, 16), (80.0, -16.0));
        assert_eq!(field.tile_seed.len(), 16);
    }

    #[test]
    fn test_home_tile_seed_is_base() {
        let field = generate_field(&params(), None).unwrap();
        assert_eq!(field.tile_seed, "abc");
    }

    #[test]
    fn test_mask_flattens_home_tile() {
        let p = FieldParams {
            flatten_target: 0.25,
            ..params()
        };
        let mask = mask_with_center_structure();
        let field = generate_field(&p, Some(&mask)).unwrap();

        // Structure cell (4, 4) covers local [0, 4)²: vertices 8..=9 on a 2-unit step.
        let s = field.get(9, 9).unwrap();
        assert_eq!(s.final_height, 0.25);
        assert_eq!(s.color, color_for(0.25, &p.biome));

        // Far corner is untouched.
        let corner = field.get(0, 0).unwrap();
        assert_eq!(corner.final_height, corner.height);
    }

    #[test]
    fn test_mask_ignored_off_home() {
        let mask = mask_with_center_structure();
        let p = params().for_tile(TileCoord::new(1, 0));
        assert!(!p.is_home);
        let masked = generate_field(&p, Some(&mask)).unwrap();
        let plain = generate_field(&p, None).unwrap();
        assert_eq!(hash_field(&masked), hash_field(&plain));
    }

    #[test]
    fn test_empty_mask_is_noop() {
        let empty = StructureMask::empty(MaskGrid::new(8, 4.0));
        let masked = generate_field(&params(), Some(&empty)).unwrap();
        let plain = generate_field(&params(), None).unwrap();
        assert_eq!(masked, plain);
    }

    #[test]
    fn test_seam_between_horizontal_neighbors() {
        let home = generate_field(&params(), None).unwrap();
        let east = generate_field(&params().for_tile(TileCoord::new(1, 0)), None).unwrap();
        let last = home.size() - 1;
        for iz in 0..home.size() {
            let a = home.get(last, iz).unwrap();
            let b = east.get(0, iz).unwrap();
            assert_eq!(a.height.to_bits(), b.height.to_bits(), "Seam mismatch at row {iz}");
        }
    }

    #[test]
    fn test_seam_between_vertical_neighbors() {
        let home = generate_field(&params(), None).unwrap();
        let south = generate_field(&params().for_tile(TileCoord::new(0, 1)), None).unwrap();
        let last = home.size() - 1;
        for ix in 0..home.size() {
            assert_eq!(
                home.get(ix, last).unwrap().height.to_bits(),
                south.get(ix, 0).unwrap().height.to_bits()
            );
        }
    }

    #[test]
    fn test_invalid_params_rejected() {
        let zero = FieldParams {
            resolution: 0,
            ..params()
        };
        assert!(matches!(generate_field(&zero, None), Err(FieldError::ZeroResolution)));

        let bad_size = FieldParams {
            tile_size: -5.0,
            ..params()
        };
        assert!(matches!(
            generate_field(&bad_size, None),
            Err(FieldError::InvalidTileSize(_))
        ));

        let bad_target = FieldParams {
            flatten_target: 2.0,
            ..params()
        };
        assert!(matches!(
            generate_field(&bad_target, None),
            Err(FieldError::InvalidFlattenTarget(_))
        ));

        let mut bad_biome = params();
        bad_biome.biome.thresholds.high = bad_biome.biome.thresholds.deep;
        assert!(matches!(generate_field(&bad_biome, None), Err(FieldError::Biome(_))));

        let bad_mask = StructureMask::empty(MaskGrid::new(4, 0.0));
        assert!(matches!(
            generate_field(&params(), Some(&bad_mask)),
            Err(FieldError::InvalidCellSize(_))
        ));
    }

    #[test]
    fn test_neighborhood_matches_individual_tiles() {
        let mask = mask_with_center_structure();
        let tiles = generate_neighborhood(&params(), Some(&mask)).unwrap();
        assert_eq!(tiles.len(), 9);

        for (neighbor, field) in &tiles {
            let expected_params = params().for_tile(neighbor.coord(TileCoord::HOME).unwrap());
            let expected = generate_field(&expected_params, Some(&mask)).unwrap();
            assert_eq!(
                hash_field(field),
                hash_field(&expected),
                "Tile {} differs when generated in parallel",
                neighbor.label
            );
        }

        let center = &tiles.iter().find(|(n, _)| n.is_center()).unwrap().1;
        assert!(center.samples.iter().any(|s| s.final_height != s.height));
        for (neighbor, field) in tiles.iter().filter(|(n, _)| !n.is_center()) {
            assert!(
                field.samples.iter().all(|s| s.final_height == s.height),
                "Neighbour {} must not be masked",
                neighbor.label
            );
        }
    }

    #[test]
    fn test_neighborhood_off_center_masks_home_tile() {
        let mask = mask_with_center_structure();
        let east = params().for_tile(TileCoord::new(1, 0));
        let tiles = generate_neighborhood(&east, Some(&mask)).unwrap();

        for (neighbor, field) in &tiles {
            let masked = field.samples.iter().any(|s| s.final_height != s.height);
            assert_eq!(
                masked,
                field.tile.is_home(),
                "Tile {} (label {}) masking must follow the home coordinate",
                field.tile,
                neighbor.label
            );
        }
        let home = &tiles.iter().find(|(n, _)| n.label == "W").unwrap().1;
        assert_eq!(home.tile, TileCoord::HOME);
        assert_eq!(home.tile_seed, "abc");
    }

    #[test]
    fn test_neighborhood_at_grid_edge_rejected() {
        let edge = params().for_tile(TileCoord::new(i32::MAX, 0));
        assert!(matches!(
            generate_neighborhood(&edge, None),
            Err(FieldError::TileOutOfRange(tile)) if tile.x == i32::MAX
        ));
    }

    #[test]
    fn test_elevation_scales_final_height() {
        let field = generate_field(&params(), None).unwrap();
        let s = field.get(3, 5).unwrap();
        assert_eq!(field.elevation(3, 5), Some(s.final_height * field.height_scale));
        assert!(field.min_height() <= field.max_height());
    }
}
