//! Deterministic seeding utilities.
//!
//! Provides the string/number seed hash, the seeded pseudo-random stream that
//! every downstream generator draws from, and deterministic math helpers via
//! `libm` for cross-platform bit-exact terrain generation.

use std::fmt;

use rand_core::{RngCore, impls};

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// A caller-supplied world seed.
///
/// Text seeds are the common case (typed in by users); numeric seeds are kept
/// distinct so that `Seed::Number(42)` and `Seed::Text("42")` hash differently.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Seed {
    /// Free-form text seed, hashed by UTF-16 code unit.
    Text(String),
    /// Integer seed, truncated to 32 bits.
    Number(i64),
}

impl Seed {
    /// Hash this seed to a non-zero 32-bit state value.
    pub fn hash(&self) -> u32 {
        match self {
            Seed::Text(text) => hash_str(text),
            Seed::Number(n) => hash_number(*n),
        }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::Text(text) => f.write_str(text),
            Seed::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Seed::Text(value.to_string())
    }
}

impl From<String> for Seed {
    fn from(value: String) -> Self {
        Seed::Text(value)
    }
}

impl From<i64> for Seed {
    fn from(value: i64) -> Self {
        Seed::Number(value)
    }
}

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Seed::Number(i64::from(value))
    }
}

/// Rolling string hash: `h = h * 31 + code_unit` in wrapping `i32`, then
/// `|h|`, never zero.
///
/// Not a security primitive; collisions are trivially constructible.
pub fn hash_str(text: &str) -> u32 {
    let mut h: i32 = 0;
    for unit in text.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit));
    }
    h.unsigned_abs().max(1)
}

/// Reinterpret an integer seed as `u32` (two's complement truncation), never zero.
pub fn hash_number(value: i64) -> u32 {
    (value as u32).max(1)
}

// ---------------------------------------------------------------------------
// Seeded RNG
// ---------------------------------------------------------------------------

/// Reproducible pseudo-random stream keyed by a hashed [`Seed`].
///
/// One 32-bit state register advanced by a constant-add followed by two
/// multiply/xorshift rounds. The mixing constants are part of the terrain
/// compatibility contract: changing them changes every permutation table and
/// therefore every generated world.
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u32,
    initial: u32,
}

impl SeededRng {
    const INCREMENT: u32 = 0x6D2B_79F5;
    const TO_UNIT: f64 = 4_294_967_296.0;

    /// Create a stream for the given seed.
    pub fn new(seed: &Seed) -> Self {
        Self::from_state(seed.hash())
    }

    /// Create a stream directly from an already-hashed state value.
    pub fn from_state(state: u32) -> Self {
        Self {
            state,
            initial: state,
        }
    }

    /// Advance the stream and return the raw mixed 32-bit output.
    #[inline]
    pub fn next_raw(&mut self) -> u32 {
        self.state = self.state.wrapping_add(Self::INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_raw()) / Self::TO_UNIT
    }

    /// Next value in `[min, max)`.
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Rewind to the hashed seed, replaying the exact same sequence.
    pub fn reset(&mut self) {
        self.state = self.initial;
    }

    /// Current state register.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// The hashed seed this stream started from.
    pub fn initial_state(&self) -> u32 {
        self.initial
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

// ---------------------------------------------------------------------------
// Deterministic math (libm)
// ---------------------------------------------------------------------------

/// Deterministic sqrt using libm (not platform libc).
#[inline]
pub fn det_sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}

/// Deterministic floor using libm.
#[inline]
pub fn det_floor(x: f64) -> f64 {
    libm::floor(x)
}
