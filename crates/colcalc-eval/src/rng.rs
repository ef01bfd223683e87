//! Per-call random streams.
//!
//! Every volatile call gets its own `SmallRng`. With a seed the stream is a
//! pure function of `(seed, salt)`, so re-evaluating a column replays the
//! same draws; without one the streams come from process entropy.

use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static ENTROPY: Lazy<u64> = Lazy::new(|| {
    use rand::RngCore;
    SmallRng::from_entropy().next_u64()
});

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// splitmix64 finaliser.
fn mix(seed: u64, salt: u64) -> u64 {
    let mut z = seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RngSource {
    seed: Option<u64>,
}

impl RngSource {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn entropy() -> Self {
        Self { seed: None }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn stream(&self, salt: u64) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(mix(seed, salt)),
            None => {
                let n = COUNTER.fetch_add(1, Ordering::Relaxed);
                SmallRng::seed_from_u64(mix(*ENTROPY ^ n, salt))
            }
        }
    }
}

/// Salt identifying one call of `function`; `discriminator` separates rows
/// or groups of the same call.
pub fn call_salt(function: &str, discriminator: u64) -> u64 {
    let mut h = FxHasher::default();
    function.hash(&mut h);
    discriminator.hash(&mut h);
    h.finish()
}
