//! Biome registry: the built-in [`BiomeKind`] set plus name-based lookup with
//! a fallback profile.

use hashbrown::HashMap;

use super::{BiomeProfile, ColorStops, Rgb, Thresholds};

/// Unique identifier for a registered biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BiomeId(pub u16);

/// Errors that can occur when registering biomes.
#[derive(Debug, thiserror::Error)]
pub enum BiomeRegistryError {
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),

    /// Thresholds are not strictly increasing, so banding is ill-defined.
    #[error("biome {0}: thresholds must be strictly increasing (deep < low < mid < high)")]
    NonIncreasingThresholds(String),

    /// A scalar or colour parameter is out of range.
    #[error("biome {name}: {what}")]
    InvalidParameter { name: String, what: String },
}

/// The built-in biome set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BiomeKind {
    Grassland,
    Desert,
    Tundra,
    Volcanic,
    Alien,
    Canyon,
}

impl BiomeKind {
    /// Every built-in biome, in registration order.
    pub const ALL: [BiomeKind; 6] = [
        BiomeKind::Grassland,
        BiomeKind::Desert,
        BiomeKind::Tundra,
        BiomeKind::Volcanic,
        BiomeKind::Alien,
        BiomeKind::Canyon,
    ];

    /// Profile used when a requested name is unknown.
    pub const DEFAULT: BiomeKind = BiomeKind::Grassland;

    /// Registry name.
    pub fn name(self) -> &'static str {
        match self {
            BiomeKind::Grassland => "grassland",
            BiomeKind::Desert => "desert",
            BiomeKind::Tundra => "tundra",
            BiomeKind::Volcanic => "volcanic",
            BiomeKind::Alien => "alien",
            BiomeKind::Canyon => "canyon",
        }
    }

    /// Case-insensitive name lookup.
    pub fn from_name(name: &str) -> Option<BiomeKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Name lookup falling back to [`BiomeKind::DEFAULT`] on a miss.
    pub fn from_name_or_default(name: &str) -> BiomeKind {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!(
                requested = name,
                fallback = Self::DEFAULT.name(),
                "unknown biome, using default"
            );
            Self::DEFAULT
        })
    }

    /// The full built-in profile.
    pub fn profile(self) -> BiomeProfile {
        let (height_scale, noise_scale, octaves, colors, thresholds) = match self {
            BiomeKind::Grassland => (
                8.0,
                0.05,
                4,
                stops(0x1E4D8C, 0xC2B280, 0x4C9A2A, 0x6B5B45, 0xF2F2F2),
                Thresholds { deep: -0.3, low: -0.1, mid: 0.3, high: 0.6 },
            ),
            BiomeKind::Desert => (
                5.0,
                0.03,
                3,
                stops(0x8B5A2B, 0xD2B48C, 0xEDC9AF, 0xC19A6B, 0xFFF2D5),
                Thresholds { deep: -0.5, low: -0.2, mid: 0.2, high: 0.5 },
            ),
            BiomeKind::Tundra => (
                6.0,
                0.04,
                5,
                stops(0x2E5E7E, 0x8FA5B2, 0xB8C7CE, 0xDDE6EA, 0xFFFFFF),
                Thresholds { deep: -0.4, low: -0.15, mid: 0.15, high: 0.45 },
            ),
            BiomeKind::Volcanic => (
                12.0,
                0.06,
                6,
                stops(0xFF4500, 0x8B0000, 0x2F2F2F, 0x1A1A1A, 0x4A4A4A),
                Thresholds { deep: -0.6, low: -0.35, mid: 0.1, high: 0.55 },
            ),
            BiomeKind::Alien => (
                10.0,
                0.07,
                5,
                stops(0x3D0066, 0x00CED1, 0x7FFF00, 0xFF00FF, 0xE0FFFF),
                Thresholds { deep: -0.35, low: -0.05, mid: 0.25, high: 0.65 },
            ),
            BiomeKind::Canyon => (
                14.0,
                0.025,
                6,
                stops(0x4A2C1A, 0x8B4513, 0xB5651D, 0xD2691E, 0xF4A460),
                Thresholds { deep: -0.45, low: -0.1, mid: 0.2, high: 0.5 },
            ),
        };

        BiomeProfile {
            name: self.name().to_string(),
            height_scale,
            noise_scale,
            octaves,
            colors,
            thresholds,
        }
    }
}

fn stops(deep: u32, low: u32, mid: u32, high: u32, peak: u32) -> ColorStops {
    ColorStops {
        deep: Rgb::from_hex(deep),
        low: Rgb::from_hex(low),
        mid: Rgb::from_hex(mid),
        high: Rgb::from_hex(high),
        peak: Rgb::from_hex(peak),
    }
}

/// Stores validated biome profiles with O(1) lookup by ID or name.
pub struct BiomeRegistry {
    biomes: Vec<BiomeProfile>,
    name_to_id: HashMap<String, BiomeId>,
    fallback: Option<BiomeId>,
}

impl BiomeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            biomes: Vec::new(),
            name_to_id: HashMap::new(),
            fallback: None,
        }
    }

    /// Creates a registry holding every [`BiomeKind`], with
    /// [`BiomeKind::DEFAULT`] as the fallback.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for kind in BiomeKind::ALL {
            let id = BiomeId(registry.biomes.len() as u16);
            registry.name_to_id.insert(kind.name().to_string(), id);
            registry.biomes.push(kind.profile());
            if kind == BiomeKind::DEFAULT {
                registry.fallback = Some(id);
            }
        }
        registry
    }

    /// Registers a new biome profile, returning its assigned [`BiomeId`].
    ///
    /// The first registered biome becomes the fallback unless one is already set.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeRegistryError::DuplicateName`] if a biome with the same
    /// name exists, or the validation error from [`BiomeProfile::validate`].
    pub fn register(&mut self, profile: BiomeProfile) -> Result<BiomeId, BiomeRegistryError> {
        if self.name_to_id.contains_key(&profile.name) {
            return Err(BiomeRegistryError::DuplicateName(profile.name.clone()));
        }
        profile.validate()?;

        let id = BiomeId(self.biomes.len() as u16);
        self.name_to_id.insert(profile.name.clone(), id);
        self.biomes.push(profile);
        self.fallback.get_or_insert(id);
        Ok(id)
    }

    /// Make `id` the profile returned for unknown names.
    pub fn set_fallback(&mut self, id: BiomeId) {
        self.fallback = Some(id);
    }

    /// Returns the profile for the given biome ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn get(&self, id: BiomeId) -> &BiomeProfile {
        &self.biomes[id.0 as usize]
    }

    /// Looks up a biome ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }

    /// Looks up a profile by name, falling back to the designated default.
    ///
    /// Returns `None` only for an empty registry.
    pub fn get_or_default(&self, name: &str) -> Option<&BiomeProfile> {
        match self.lookup_by_name(name) {
            Some(id) => Some(self.get(id)),
            None => {
                let fallback = self.fallback?;
                tracing::warn!(
                    requested = name,
                    fallback = %self.get(fallback).name,
                    "unknown biome, using default"
                );
                Some(self.get(fallback))
            }
        }
    }

    /// Iterates registered profiles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, &BiomeProfile)> {
        self.biomes
            .iter()
            .enumerate()
            .map(|(i, profile)| (BiomeId(i as u16), profile))
    }

    /// Returns the number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Returns `true` if no biomes are registered.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

impl Default for BiomeRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
