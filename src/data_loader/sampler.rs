//! src/data_loader/sampler.rs
//! View sampling for multi-view datasets.
//!
//! Every call to `get_views` gets its own generator, seeded from one draw
//! of the caller's generator plus the sample index. That makes the chosen
//! views a function of (caller generator state, idx) only.
//!  * `derive_seed`  – the seed arithmetic.
//!  * `ViewSampler`  – draws distinct positions without replacement.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::data_loader::dataset::DatasetError;

/// Trait for index producers.
pub trait Sampler {
    /// Return the next index to fetch, or `None` when exhausted.
    fn next_index(&mut self) -> Option<usize>;
    /// (Optional) remaining items hint.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

/// Per-call seed: a 32-bit draw plus the sample index, in 64 bits.
///
/// The sum does not wrap at 2^32.
pub fn derive_seed(draw: u32, idx: usize) -> u64 {
    u64::from(draw).wrapping_add(idx as u64)
}

/// Consume one `u32` from `rng` and build the per-call generator.
pub fn call_rng(rng: &mut dyn RngCore, idx: usize) -> ChaCha20Rng {
    let seed = derive_seed(rng.next_u32(), idx);
    tracing::trace!(idx, seed, "derived per-call seed");
    ChaCha20Rng::seed_from_u64(seed)
}

/// Yields `amount` distinct indices from `0..population`, uniformly, in draw order.
#[derive(Debug, Clone)]
pub struct ViewSampler {
    indices: Vec<usize>,
    pos: usize,
}

impl ViewSampler {
    /// Draw `amount` of `population` positions using `rng`.
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        population: usize,
        amount: usize,
    ) -> Result<Self, DatasetError> {
        if amount > population {
            return Err(DatasetError::NotEnoughSamples {
                requested: amount,
                available: population,
            });
        }

        let mut indices: Vec<usize> = (0..population).collect();

        // === Partial Fisher–Yates: only the first `amount` slots are settled ===
        for i in 0..amount {
            let j = rng.random_range(i..population);
            indices.swap(i, j);
        }
        indices.truncate(amount);

        Ok(Self { indices, pos: 0 })
    }

    /// Same as [`ViewSampler::new`], seeded from `seed`.
    pub fn with_seed(seed: u64, population: usize, amount: usize) -> Result<Self, DatasetError> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        Self::new(&mut rng, population, amount)
    }

    /// The full draw, without consuming the sampler.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl Sampler for ViewSampler {
    fn next_index(&mut self) -> Option<usize> {
        if self.pos < self.indices.len() {
            let i = self.indices[self.pos];
            self.pos += 1;
            Some(i)
        } else {
            None
        }
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.indices.len().saturating_sub(self.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_is_widened() {
        assert_eq!(derive_seed(0, 5), 5);
        assert_eq!(derive_seed(u32::MAX, 1), 1u64 << 32);
    }

    #[test]
    fn draws_are_distinct_and_in_range() {
        for seed in 0..50 {
            let mut s = ViewSampler::with_seed(seed, 10, 7).unwrap();
            assert_eq!(s.remaining(), Some(7));
            let got: Vec<_> = std::iter::from_fn(|| s.next_index()).collect();
            assert_eq!(got.len(), 7);
            assert!(got.iter().all(|&i| i < 10));
            let uniq: HashSet<_> = got.iter().collect();
            assert_eq!(uniq.len(), 7);
            assert_eq!(s.remaining(), Some(0));
        }
    }

    #[test]
    fn whole_population_is_a_permutation() {
        let s = ViewSampler::with_seed(3, 6, 6).unwrap();
        let mut got = s.indices().to_vec();
        got.sort();
        assert_eq!(got, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn same_seed_same_draw() {
        let a = ViewSampler::with_seed(42, 100, 4).unwrap();
        let b = ViewSampler::with_seed(42, 100, 4).unwrap();
        assert_eq!(a.indices(), b.indices());
    }

    #[test]
    fn too_many_views_fails() {
        let err = ViewSampler::with_seed(0, 3, 4).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::NotEnoughSamples { requested: 4, available: 3 }
        ));
        // drawing nothing from nothing is fine
        assert!(ViewSampler::with_seed(0, 0, 0).unwrap().indices().is_empty());
    }

    #[test]
    fn call_rng_consumes_one_draw() {
        let mut base = ChaCha20Rng::seed_from_u64(9);
        let mut twin = base.clone();
        let _ = call_rng(&mut base, 3);
        twin.next_u32();
        assert_eq!(base.next_u64(), twin.next_u64());
    }

    #[test]
    fn call_rng_depends_on_idx() {
        let base = ChaCha20Rng::seed_from_u64(1234);
        let mut a = call_rng(&mut base.clone(), 5);
        let mut b = call_rng(&mut base.clone(), 6);
        assert_ne!(a.next_u64(), b.next_u64());
    }
}
