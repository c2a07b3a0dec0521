use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seeded pseudo-random source owned by exactly one generator or scenario.
#[derive(Debug, Clone)]
pub struct Prng {
    inner: StdRng,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeds from wall-clock nanoseconds. `offset` keeps generators created within
    /// the same clock tick apart.
    pub fn from_clock(offset: u64) -> Self {
        Self::new(clock_seed().wrapping_add(offset))
    }

    pub fn uint64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Uniform draw in `[0, n)`. Panics if `n == 0`.
    pub fn intn(&mut self, n: usize) -> usize {
        assert!(n > 0, "intn: n must be positive");
        self.inner.gen_range(0..n)
    }
}

pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
