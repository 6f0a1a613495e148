//! Precomputed pools of bounded random integers.
//!
//! Drawing from a real RNG for every repeat count and every set member is
//! the hot path of content generation. Instead, each multiplier and each
//! character set owns a small pool filled once at parse time and read
//! cyclically afterwards.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of entries in every pool.
pub const POOL_SIZE: usize = 255;

/// A fixed-size circular buffer of integers drawn uniformly from `[min, max]`.
#[derive(Debug, Clone)]
pub struct BoundedRandomSource {
    pool: Vec<u32>,
    cursor: usize,
    min: u32,
    max: u32,
}

impl BoundedRandomSource {
    /// Fill a new pool from the given RNG.
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn new<R: Rng>(min: u32, max: u32, rng: &mut R) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let pool = (0..POOL_SIZE)
            .map(|_| rng.random_range(min..=max))
            .collect();

        Self {
            pool,
            cursor: 0,
            min,
            max,
        }
    }

    /// Fill a new pool from a fixed seed.
    pub fn seeded(min: u32, max: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new(min, max, &mut rng)
    }

    /// Return the entry under the cursor and advance, wrapping to the start.
    pub fn draw(&mut self) -> u32 {
        let value = self.pool[self.cursor];
        self.cursor = (self.cursor + 1) % self.pool.len();
        value
    }

    /// Inclusive bounds of the pool.
    pub fn bounds(&self) -> (u32, u32) {
        (self.min, self.max)
    }
}

impl Iterator for BoundedRandomSource {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        Some(self.draw())
    }
}
