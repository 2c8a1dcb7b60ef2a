//! Deterministic PRNG backing `Chance` conditions.
//!
//! SplitMix64: 8 bytes of state, trivially serializable for snapshots. An
//! uncertain `Chance(p)` flip draws exactly one value and 0% or 100% draw
//! none, so a restored generator resumes the same coin sequence.

use crate::fixed::Fixed64;

/// SplitMix64 pseudo-random number generator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Returns `true` with the given probability in `[0, 1]`.
    pub fn chance(&mut self, probability: Fixed64) -> bool {
        if probability <= Fixed64::ZERO {
            return false;
        }
        if probability >= Fixed64::from_num(1) {
            return true;
        }
        // For p in (0, 1) the Q32.32 bits are the fraction scaled to 2^32.
        let upper = self.next_u64() >> 32;
        upper < probability.to_bits() as u64
    }

    pub fn state(&self) -> u64 {
        self.state
    }
}
