//! Seeded 2D simplex noise.
//!
//! The permutation table is shuffled from a [`SeededRng`], so the whole noise
//! field is a pure function of the seed. Corner selection, the 12-gradient set
//! and the final `70.0` scale are fixed: other clients that reproduce them
//! bit-for-bit sample the same terrain.

use crate::seed::{Seed, SeededRng, det_floor};

/// Skew factor into simplex space: `(sqrt(3) - 1) / 2`.
const F2: f64 = 0.366_025_403_784_438_6;
/// Unskew factor back to input space: `(3 - sqrt(3)) / 6`.
const G2: f64 = 0.211_324_865_405_187_13;

/// Scale that maps the summed corner contributions to roughly `[-1, 1]`.
const NORMALIZE: f64 = 70.0;

/// Gradient directions (edge midpoints of a cube, projected onto x/y).
const GRAD2: [[f64; 2]; 12] = [
    [1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [-1.0, -1.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
    [0.0, 1.0],
    [0.0, -1.0],
];

/// Doubled 256-entry permutation plus its gradient-index (`mod 12`) twin.
///
/// Immutable after construction. Building one consumes exactly
/// [`PermutationTable::RNG_DRAWS`] values from the stream.
#[derive(Clone)]
pub struct PermutationTable {
    perm: [u8; 512],
    perm_mod12: [u8; 512],
}

impl PermutationTable {
    /// Number of RNG draws a Fisher–Yates shuffle of 256 entries takes.
    pub const RNG_DRAWS: usize = 255;

    /// Shuffle `0..=255` with `rng`, walking from the top index down to 1.
    pub fn new(rng: &mut SeededRng) -> Self {
        let mut p = [0u8; 256];
        for (i, slot) in p.iter_mut().enumerate() {
            *slot = i as u8;
        }

        for i in (1..256).rev() {
            let j = det_floor(rng.next_f64() * (i + 1) as f64) as usize;
            p.swap(i, j);
        }

        let mut perm = [0u8; 512];
        let mut perm_mod12 = [0u8; 512];
        for i in 0..512 {
            perm[i] = p[i & 255];
            perm_mod12[i] = perm[i] % 12;
        }

        Self { perm, perm_mod12 }
    }

    /// Permutation value at `index` (`0..512`).
    #[inline]
    pub fn perm(&self, index: usize) -> u8 {
        self.perm[index]
    }

    /// Gradient index at `index` (`0..512`), always `< 12`.
    #[inline]
    pub fn gradient_index(&self, index: usize) -> usize {
        self.perm_mod12[index] as usize
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}

/// Single-octave 2D simplex noise over a seeded permutation table.
#[derive(Clone, Debug)]
pub struct SimplexNoise {
    table: PermutationTable,
}

impl SimplexNoise {
    /// Build a fresh RNG from `seed` and shuffle a table from it.
    pub fn new(seed: &Seed) -> Self {
        let mut rng = SeededRng::new(seed);
        Self::from_rng(&mut rng)
    }

    /// Build from an existing stream, advancing it by 255 draws.
    pub fn from_rng(rng: &mut SeededRng) -> Self {
        Self {
            table: PermutationTable::new(rng),
        }
    }

    /// The backing permutation table.
    pub fn table(&self) -> &PermutationTable {
        &self.table
    }

    /// Sample noise at `(x, y)`. Output is approximately in `[-1, 1]`, but
    /// not hard-bounded; callers clamp after composition.
    pub fn noise2d(&self, x: f64, y: f64) -> f64 {
        // Skew input space to find the containing simplex cell.
        let s = (x + y) * F2;
        let i = det_floor(x + s) as i64;
        let j = det_floor(y + s) as i64;

        let t = (i + j) as f64 * G2;
        let x0 = x - (i as f64 - t);
        let y0 = y - (j as f64 - t);

        // Lower triangle (x0 > y0) steps in x first, upper steps in y first.
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let table = &self.table;
        let gi0 = table.gradient_index(ii + table.perm(jj) as usize);
        let gi1 = table.gradient_index(ii + i1 + table.perm(jj + j1) as usize);
        let gi2 = table.gradient_index(ii + 1 + table.perm(jj + 1) as usize);

        let n0 = corner(gi0, x0, y0);
        let n1 = corner(gi1, x1, y1);
        let n2 = corner(gi2, x2, y2);

        NORMALIZE * (n0 + n1 + n2)
    }
}

/// Contribution of one simplex corner: `(0.5 - d²)⁴ · (g · d)`, zero outside
/// the corner's radius.
#[inline]
fn corner(gradient: usize, x: f64, y: f64) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let t2 = t * t;
    let g = GRAD2[gradient];
    t2 * t2 * (g[0] * x + g[1] * y)
}
