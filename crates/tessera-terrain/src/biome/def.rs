//! Biome profile: the parameter bundle governing one terrain style.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::BiomeRegistryError;

/// Linear RGB colour with channels in `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    /// Construct from channel values.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Construct from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f64 / 255.0,
            g: ((hex >> 8) & 0xFF) as f64 / 255.0,
            b: (hex & 0xFF) as f64 / 255.0,
        }
    }

    /// Linear blend: `t = 0` is `self`, `t = 1` is `other`.
    #[inline]
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Returns `true` if every channel is finite and within `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }

    /// Quantize to 8-bit RGBA with full alpha.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), 255]
    }
}

/// The five colour stops of a biome, lowest to highest.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStops {
    pub deep: Rgb,
    pub low: Rgb,
    pub mid: Rgb,
    pub high: Rgb,
    pub peak: Rgb,
}

/// Height thresholds separating the colour bands. Must be strictly increasing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub deep: f64,
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl Thresholds {
    /// Returns `true` if `deep < low < mid < high` and all are finite.
    pub fn is_strictly_increasing(&self) -> bool {
        let t = [self.deep, self.low, self.mid, self.high];
        t.iter().all(|v| v.is_finite()) && t.windows(2).all(|w| w[0] < w[1])
    }
}

/// Full descriptor for a biome type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeProfile {
    /// Registry name (e.g., "grassland").
    pub name: String,
    /// World-units multiplier applied to normalized heights. Must be `> 0`.
    pub height_scale: f64,
    /// World-to-noise frequency. Must be `> 0`.
    pub noise_scale: f64,
    /// Fractal octave count. Must be `>= 1`.
    pub octaves: u32,
    /// Colour ramp.
    pub colors: ColorStops,
    /// Band boundaries for the colour ramp.
    pub thresholds: Thresholds,
}

impl BiomeProfile {
    /// Check the invariants the banding and field builder rely on.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeRegistryError::NonIncreasingThresholds`] for unordered
    /// thresholds and [`BiomeRegistryError::InvalidParameter`] for
    /// non-positive scales, zero octaves or out-of-range colours.
    pub fn validate(&self) -> Result<(), BiomeRegistryError> {
        if !self.thresholds.is_strictly_increasing() {
            return Err(BiomeRegistryError::NonIncreasingThresholds(self.name.clone()));
        }
        let invalid = |what: &str| -> Result<(), BiomeRegistryError> {
            Err(BiomeRegistryError::InvalidParameter {
                name: self.name.clone(),
                what: what.to_string(),
            })
        };
        if !(self.height_scale.is_finite() && self.height_scale > 0.0) {
            return invalid("height_scale must be positive");
        }
        if !(self.noise_scale.is_finite() && self.noise_scale > 0.0) {
            return invalid("noise_scale must be positive");
        }
        if self.octaves == 0 {
            return invalid("octaves must be at least 1");
        }
        let c = &self.colors;
        if ![c.deep, c.low, c.mid, c.high, c.peak]
            .iter()
            .all(Rgb::is_normalized)
        {
            return invalid("colour channels must lie in [0, 1]");
        }
        Ok(())
    }

    /// Content hash over every parameter, used in cache keys.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.name.hash(&mut hasher);
        self.height_scale.to_bits().hash(&mut hasher);
        self.noise_scale.to_bits().hash(&mut hasher);
        self.octaves.hash(&mut hasher);
        let c = &self.colors;
        for rgb in [c.deep, c.low, c.mid, c.high, c.peak] {
            rgb.r.to_bits().hash(&mut hasher);
            rgb.g.to_bits().hash(&mut hasher);
            rgb.b.to_bits().hash(&mut hasher);
        }
        let t = &self.thresholds;
        for v in [t.deep, t.low, t.mid, t.high] {
            v.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}
