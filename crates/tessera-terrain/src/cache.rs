//! Concurrent memo of generated tiles.
//!
//! Generation is idempotent, so a field can be reused for any later request
//! with the same seed, biome, resolution, tile and mask contents.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::field::{FieldError, FieldParams, TerrainField, generate_field};
use crate::seed::Seed;
use crate::structure::StructureMask;
use crate::tile::TileCoord;

/// Everything a generated field depends on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldKey {
    seed: Seed,
    biome: u64,
    resolution: u32,
    tile_size_bits: u64,
    tile: TileCoord,
    flatten_target_bits: u64,
    is_home: bool,
    /// `None` when no mask applies to this tile.
    mask: Option<u64>,
}

impl FieldKey {
    pub fn new(params: &FieldParams, mask: Option<&StructureMask>) -> Self {
        let mask = mask
            .filter(|m| params.is_home && !m.is_empty())
            .map(StructureMask::fingerprint);
        Self {
            seed: params.seed.clone(),
            biome: params.biome.fingerprint(),
            resolution: params.resolution,
            tile_size_bits: params.tile_size.to_bits(),
            tile: params.tile,
            flatten_target_bits: params.flatten_target.to_bits(),
            is_home: params.is_home,
            mask,
        }
    }
}

/// Thread-safe field cache with hit/miss counters.
///
/// Entries are never evicted on their own. Callers that walk the world call
/// [`FieldCache::retain_near`] as the focus tile moves, or [`FieldCache::clear`].
#[derive(Default)]
pub struct FieldCache {
    entries: DashMap<FieldKey, Arc<TerrainField>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached field for these inputs, generating it on a miss.
    ///
    /// The map is not locked while generating; if two threads miss on the
    /// same key, the first insert wins and both receive that field.
    ///
    /// # Errors
    ///
    /// Propagates [`FieldError`] from [`generate_field`]. Failures are not cached.
    pub fn get_or_generate(
        &self,
        params: &FieldParams,
        mask: Option<&StructureMask>,
    ) -> Result<Arc<TerrainField>, FieldError> {
        let key = FieldKey::new(params, mask);
        if let Some(field) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(field.value()));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(tile = %params.tile, "field cache miss");
        let field = Arc::new(generate_field(params, mask)?);
        let entry = self.entries.entry(key).or_insert(field);
        Ok(Arc::clone(entry.value()))
    }

    /// Number of cached fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict fields whose tile lies more than `radius` tiles from `center`
    /// on either axis. Returns how many were dropped.
    pub fn retain_near(&self, center: TileCoord, radius: u32) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| {
            key.tile.x.abs_diff(center.x) <= radius && key.tile.z.abs_diff(center.z) <= radius
        });
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            tracing::debug!(%center, radius, evicted, "evicted distant fields");
        }
        evicted
    }

    /// Drop every cached field. Counters are kept.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
