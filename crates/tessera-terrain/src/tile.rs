//! Tile addressing: integer tile coordinates, the 3×3 neighbourhood, and
//! per-tile nominal seeds.
//!
//! Tile seeds are identifiers only. Height generation always keys its noise
//! off the base seed so that neighbouring tiles sample one continuous field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::seed::{Seed, hash_str};

/// Integer tile position on the world grid. `(0, 0)` is the home tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub z: i32,
}

impl TileCoord {
    /// The home tile, the only one that receives structure masking.
    pub const HOME: TileCoord = TileCoord { x: 0, z: 0 };

    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns `true` for `(0, 0)`.
    pub fn is_home(self) -> bool {
        self == Self::HOME
    }

    /// This coordinate shifted by `(dx, dz)`, or `None` past the `i32` range.
    pub fn offset(self, dx: i32, dz: i32) -> Option<TileCoord> {
        Some(TileCoord {
            x: self.x.checked_add(dx)?,
            z: self.z.checked_add(dz)?,
        })
    }

    /// World-space position of the tile centre.
    pub fn world_origin(self, tile_size: f64) -> (f64, f64) {
        (f64::from(self.x) * tile_size, f64::from(self.z) * tile_size)
    }

    /// Compact `"{x}_{z}"` key, used in file names.
    pub fn tile_id(self) -> String {
        format!("{}_{}", self.x, self.z)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// One cell of the 3×3 neighbourhood around a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileNeighbor {
    /// Compass label (`N`, `NE`, ... or `C` for the centre).
    pub label: &'static str,
    pub dx: i32,
    pub dz: i32,
}

impl TileNeighbor {
    /// Absolute coordinate of this neighbour relative to `center`, or `None`
    /// if it falls off the `i32` grid.
    pub fn coord(self, center: TileCoord) -> Option<TileCoord> {
        center.offset(self.dx, self.dz)
    }

    /// Returns `true` for the centre cell.
    pub fn is_center(self) -> bool {
        self.dx == 0 && self.dz == 0
    }
}

/// The 3×3 neighbourhood in row-major order, north (`-z`) first, centre included.
pub const NEIGHBORHOOD: [TileNeighbor; 9] = [
    TileNeighbor { label: "NW", dx: -1, dz: -1 },
    TileNeighbor { label: "N", dx: 0, dz: -1 },
    TileNeighbor { label: "NE", dx: 1, dz: -1 },
    TileNeighbor { label: "W", dx: -1, dz: 0 },
    TileNeighbor { label: "C", dx: 0, dz: 0 },
    TileNeighbor { label: "E", dx: 1, dz: 0 },
    TileNeighbor { label: "SW", dx: -1, dz: 1 },
    TileNeighbor { label: "S", dx: 0, dz: 1 },
    TileNeighbor { label: "SE", dx: 1, dz: 1 },
];

/// Length of a derived tile seed.
pub const TILE_SEED_LEN: usize = 16;

const TILE_SEED_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Nominal seed string for tile `(tile_x, tile_z)` of the world `base`.
///
/// The home tile returns the base seed unchanged. Every other tile hashes
/// `"{base}_tile_{x}_{z}"` and expands the hash into a 16-character base-36
/// string.
pub fn tile_seed(base: &Seed, tile_x: i32, tile_z: i32) -> String {
    if tile_x == 0 && tile_z == 0 {
        return base.to_string();
    }
    let hash = hash_str(&format!("{base}_tile_{tile_x}_{tile_z}"));
    encode_tile_hash(hash)
}

/// Expand a hash into [`TILE_SEED_LEN`] base-36 digits.
///
/// Each step emits `h mod 36`, then folds the next right-shift of the
/// original hash (as a signed 32-bit value) back in so the tail digits keep
/// varying after `h / 36` runs out.
fn encode_tile_hash(hash: u32) -> String {
    let signed = hash as i32;
    let mut h = i64::from(hash);
    let mut out = String::with_capacity(TILE_SEED_LEN);
    for i in 0..TILE_SEED_LEN as u32 {
        out.push(char::from(TILE_SEED_ALPHABET[(h % 36) as usize]));
        h = (h / 36 + i64::from(signed >> i)).abs();
    }
    out
}

/// Tile seeds for the 3×3 neighbourhood around `center`. Neighbours beyond
/// the `i32` grid edge are left out.
pub fn neighborhood_seeds(base: &Seed, center: TileCoord) -> Vec<(TileNeighbor, TileCoord, String)> {
    NEIGHBORHOOD
        .iter()
        .filter_map(|&n| {
            let coord = n.coord(center)?;
            Some((n, coord, tile_seed(base, coord.x, coord.z)))
        })
        .collect()
}
