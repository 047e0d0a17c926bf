//! Deterministic seeded number stream for texture assignment.
//!
//! A string seed is hashed into a 32-bit integer which becomes the state of a
//! Park–Miller "minimal standard" linear congruential generator. The same seed
//! always yields the same sequence on every platform; the state can never
//! reach zero, so the stream never collapses to a constant.

use rand::RngCore;

/// Park–Miller modulus, the Mersenne prime `2^31 - 1`.
pub const MODULUS: u64 = 2_147_483_647;

/// Park–Miller multiplier.
pub const MULTIPLIER: u64 = 16_807;

// ---------------------------------------------------------------------------
// Seed hashing
// ---------------------------------------------------------------------------

/// Hash a seed string into an unsigned 32-bit integer.
///
/// Folds `hash = hash * 31 + unit` over the UTF-16 code units of the string
/// with wrapping arithmetic, so non-ASCII seeds hash the same way a browser
/// front-end would hash them.
pub fn hash_seed(seed: &str) -> u32 {
    seed.encode_utf16()
        .fold(0u32, |hash, unit| hash.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

/// Reduce a hash into a valid generator state in `[1, MODULUS - 1]`.
fn initial_state(hash: u32) -> u32 {
    let state = (u64::from(hash) % MODULUS) as u32;
    state.max(1)
}

// ---------------------------------------------------------------------------
// SeededRandomSource
// ---------------------------------------------------------------------------

/// Seeded Park–Miller generator.
///
/// Owned by whoever drives an assignment pass and passed down explicitly;
/// nothing in the pipeline reaches for an ambient RNG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRandomSource {
    seed: String,
    hash: u32,
    state: u32,
}

impl SeededRandomSource {
    /// Creates a generator whose sequence is fully determined by `seed`.
    pub fn new(seed: &str) -> Self {
        let hash = hash_seed(seed);
        Self {
            seed: seed.to_string(),
            hash,
            state: initial_state(hash),
        }
    }

    /// The seed string this generator was created from.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// The 32-bit hash derived from the seed string.
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Current generator state. Always in `[1, MODULUS - 1]`.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advances the generator and returns the raw new state.
    #[inline]
    pub fn step(&mut self) -> u32 {
        self.state = ((u64::from(self.state) * MULTIPLIER) % MODULUS) as u32;
        self.state
    }

    /// Advances the generator and returns `(state - 1) / (MODULUS - 2)`.
    ///
    /// The result lies in `[0.0, 1.0]`; callers scaling it into an index
    /// range must clamp the upper end.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        let state = self.step();
        f64::from(state - 1) / (MODULUS - 2) as f64
    }

    /// Restarts the sequence from the seed.
    pub fn reset(&mut self) {
        self.state = initial_state(self.hash);
    }
}

impl RngCore for SeededRandomSource {
    /// Returns the raw 31-bit state after one step.
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.step());
        let lo = u64::from(self.step());
        (hi << 31) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
