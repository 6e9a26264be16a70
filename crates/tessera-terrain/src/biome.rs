//! Biome system: profile data, the built-in registry, and height-to-colour
//! banding.

mod banding;
mod def;
mod registry;

pub use banding::color_for;
pub use def::{BiomeProfile, ColorStops, Rgb, Thresholds};
pub use registry::{BiomeId, BiomeKind, BiomeRegistry, BiomeRegistryError};
