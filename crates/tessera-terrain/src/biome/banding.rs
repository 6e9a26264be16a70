//! Height-to-colour banding: five-stop piecewise-linear ramp gated by the
//! biome's four thresholds.

use super::{BiomeProfile, Rgb};

/// Colour for a normalized height under `biome`.
///
/// Below `deep` the deep stop is returned as-is. Between two thresholds the
/// bounding stops are blended by the normalized position. Above `high` the
/// blend toward `peak` is clamped to `[0, 1]`, so heights past 1.0 (or a
/// `high` threshold at or beyond 1.0) resolve to the pure peak colour.
/// Non-finite heights map to the deep stop.
pub fn color_for(height: f64, biome: &BiomeProfile) -> Rgb {
    let c = &biome.colors;
    let t = &biome.thresholds;

    if height.is_nan() || height < t.deep {
        return c.deep;
    }
    if height < t.low {
        return c.deep.lerp(c.low, (height - t.deep) / (t.low - t.deep));
    }
    if height < t.mid {
        return c.low.lerp(c.mid, (height - t.low) / (t.mid - t.low));
    }
    if height < t.high {
        return c.mid.lerp(c.high, (height - t.mid) / (t.high - t.mid));
    }

    let span = 1.0 - t.high;
    if span <= 0.0 {
        return c.peak;
    }
    let blend = ((height - t.high) / span).clamp(0.0, 1.0);
    if blend >= 1.0 {
        return c.peak;
    }
    c.high.lerp(c.peak, blend)
}
