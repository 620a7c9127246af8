//! Seedable random streams for simulation workers.
//!
//! Every random draw in the crate comes from a [`SimRng`] handed in explicitly. Streams are
//! keyed by a base seed, a [`Stream`] domain, and an index (chunk or column), and the seed of
//! each stream is mixed with SplitMix64 so neighbouring indices do not produce correlated
//! generator states. Because a stream depends only on `(seed, domain, index)`, results are
//! identical whether chunks run on one thread or many.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

/// Random generator used by samplers and the engine.
pub type SimRng = StdRng;

/// Independent random-stream domains used within one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Per-chunk streams of the independent sampling loop.
    Independent,
    /// Per-column streams for the raw marginal samples of a correlated run.
    Marginal,
    /// Stream of correlated normal scores used to reorder marginals.
    RankScores,
}

impl Stream {
    #[inline]
    fn salt(self) -> u64 {
        match self {
            Self::Independent => 0x5EED_0000_0000_0001,
            Self::Marginal => 0x5EED_0000_0000_0002,
            Self::RankScores => 0x5EED_0000_0000_0003,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    #[inline]
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// Derives the seed of stream `index` within `domain`.
#[inline]
pub fn stream_seed(base_seed: u64, domain: Stream, index: usize) -> u64 {
    let mut sm = SplitMix64::new(base_seed ^ domain.salt());
    let mixed = sm.next_u64();
    SplitMix64::new(mixed.wrapping_add(index as u64)).next_u64()
}

/// Creates the generator for stream `index` within `domain`.
#[inline]
pub fn stream_rng(base_seed: u64, domain: Stream, index: usize) -> SimRng {
    SimRng::seed_from_u64(stream_seed(base_seed, domain, index))
}

/// Returns `seed` or, when absent, a fresh base seed from the thread-local generator.
#[inline]
pub fn resolve_base_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random::<u64>)
}

/// Draws one standard normal variate.
#[inline(always)]
pub fn sample_standard_normal(rng: &mut SimRng) -> f64 {
    StandardNormal.sample(rng)
}
