//! Structure-layer export record: a flat, seed-tagged JSON snapshot of the
//! home tile's structures.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::seed::Seed;
use crate::structure::StructurePlacement;
use crate::tile::{TileCoord, tile_seed};

/// Errors that can occur when writing or reading an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The document is not valid JSON for this record.
    #[error("invalid export JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The record was written by an unknown format version.
    #[error("unsupported export version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Reading or writing the file failed.
    #[error("export I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Only the version field, parsed before the rest of the record.
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Snapshot of a structure layer, tagged with the seed it was built on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureLayerExport {
    pub version: u32,
    pub base_seed: String,
    pub tile_coord: TileCoord,
    pub tile_seed: String,
    pub timestamp: DateTime<Utc>,
    pub structures: Vec<StructurePlacement>,
}

impl StructureLayerExport {
    /// Format version written by this build. Importers reject anything else.
    pub const CURRENT_VERSION: u32 = 1;

    /// Snapshot `structures` on `tile`, stamped with the current time.
    pub fn new(base_seed: &Seed, tile: TileCoord, structures: &[StructurePlacement]) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            base_seed: base_seed.to_string(),
            tile_coord: tile,
            tile_seed: tile_seed(base_seed, tile.x, tile.z),
            timestamp: Utc::now(),
            structures: structures.to_vec(),
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a record, checking `version` before anything else.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnsupportedVersion`] for any version other than
    /// [`Self::CURRENT_VERSION`], or [`ExportError::Json`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        let probe: VersionProbe = serde_json::from_str(json)?;
        if probe.version != Self::CURRENT_VERSION {
            return Err(ExportError::UnsupportedVersion {
                found: probe.version,
                expected: Self::CURRENT_VERSION,
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Write the record to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] or [`ExportError::Json`].
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(
            path = %path.display(),
            structures = self.structures.len(),
            "wrote structure export"
        );
        Ok(())
    }

    /// Read and version-check a record from `path`.
    ///
    /// # Errors
    ///
    /// See [`Self::from_json`]; also [`ExportError::Io`].
    pub fn read_from(path: &Path) -> Result<Self, ExportError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Returns `true` if this record was built on `seed`.
    pub fn matches_seed(&self, seed: &Seed) -> bool {
        self.base_seed == seed.to_string()
    }
}
