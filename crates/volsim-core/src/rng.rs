//! Seeded sampling streams.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

/// Random stream handed to distribution samplers.
///
/// A handle from [`RngHandle::from_seed`] replays the same draws; one from
/// [`RngHandle::from_entropy`] does not.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Deterministic stream for `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Stream seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Seed of child stream `index` under `parent`.
///
/// A model seed fans out to its regions and a region seed to its properties,
/// so adding a property never shifts the draws of the ones before it.
pub fn derive_substream_seed(parent: u64, index: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(parent);
    hasher.write_u64(index);
    hasher.finish()
}
