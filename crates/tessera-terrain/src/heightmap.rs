//! Multi-octave fractal heightmap sampler.
//!
//! Composites octaves of [`SimplexNoise`] into a band-limited height signal
//! normalized to roughly `[-1, 1]`, then adds a fine detail layer and clamps.

use crate::noise::SimplexNoise;
use crate::seed::Seed;

/// Configuration for fractal composition in heightmap generation.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapParams {
    /// World seed. Always the base seed, never a per-tile seed, so that tiles
    /// sample one continuous field.
    pub seed: Seed,
    /// Frequency multiplier between successive octaves. Default: 2.0.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves. Default: 0.5.
    pub persistence: f64,
    /// Frequency multiplier of the detail layer relative to the base layer.
    /// Default: 3.0.
    pub detail_frequency: f64,
    /// Weight of the detail layer added on top of the fractal sum. Default: 0.15.
    pub detail_weight: f64,
}

impl HeightmapParams {
    /// Default parameters for the given seed.
    pub fn with_seed(seed: impl Into<Seed>) -> Self {
        Self {
            seed: seed.into(),
            ..Default::default()
        }
    }
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: Seed::Number(0),
            lacunarity: 2.0,
            persistence: 0.5,
            detail_frequency: 3.0,
            detail_weight: 0.15,
        }
    }
}

/// Sum `octaves` layers of `noise`, each at `lacunarity×` the previous
/// frequency and `persistence×` the previous amplitude, divided by the total
/// amplitude used.
///
/// Starts at frequency 1 and amplitude 1, so a single octave returns
/// `noise.noise2d(x, y)` exactly. `octaves == 0` is treated as 1.
pub fn fractal_noise(
    noise: &SimplexNoise,
    x: f64,
    y: f64,
    octaves: u32,
    lacunarity: f64,
    persistence: f64,
) -> f64 {
    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves.max(1) {
        total += noise.noise2d(x * frequency, y * frequency) * amplitude;
        max_value += amplitude;

        frequency *= lacunarity;
        amplitude *= persistence;
    }

    total / max_value
}

/// Generates terrain heights from a seeded noise field.
///
/// Owns its own RNG-derived permutation table; two samplers built from the
/// same params return bit-identical heights regardless of construction order.
#[derive(Clone, Debug)]
pub struct HeightmapSampler {
    noise: SimplexNoise,
    params: HeightmapParams,
}

impl HeightmapSampler {
    /// Create a new sampler with the given parameters.
    pub fn new(params: HeightmapParams) -> Self {
        let noise = SimplexNoise::new(&params.seed);
        Self { noise, params }
    }

    /// Normalized fractal sample at noise-space `(x, y)`.
    pub fn fractal(&self, x: f64, y: f64, octaves: u32) -> f64 {
        fractal_noise(
            &self.noise,
            x,
            y,
            octaves,
            self.params.lacunarity,
            self.params.persistence,
        )
    }

    /// Terrain height at world-space `(world_x, world_z)`, in `[-1, 1]`.
    ///
    /// Fractal base plus the weighted detail layer, hard-clamped. Downstream
    /// banding and height scaling rely on the clamp.
    pub fn terrain_height(&self, world_x: f64, world_z: f64, noise_scale: f64, octaves: u32) -> f64 {
        let nx = world_x * noise_scale;
        let nz = world_z * noise_scale;

        let base = self.fractal(nx, nz, octaves);
        let detail = self.noise.noise2d(
            nx * self.params.detail_frequency,
            nz * self.params.detail_frequency,
        );

        (base + detail * self.params.detail_weight).clamp(-1.0, 1.0)
    }

    /// Theoretical maximum of the un-normalized octave sum (geometric series).
    pub fn max_amplitude(&self, octaves: u32) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        for _ in 0..octaves.max(1) {
            sum += amp;
            amp *= self.params.persistence;
        }
        sum
    }

    /// The underlying single-octave noise.
    pub fn noise(&self) -> &SimplexNoise {
        &self.noise
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }
}
