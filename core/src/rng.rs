//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SimRng instances derived
//! from the single master seed in SimConfig.
//!
//! Each slot gets its own RNG stream, seeded deterministically
//! from (master_seed XOR slot_index). This means:
//!   - Adding a new scenario never changes existing scenarios' streams.
//!   - Each stream is fully reproducible in isolation.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single slot.
pub struct SimRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SimRng {
    /// Create an RNG from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Roll a u64 in [lo, hi], both ends included.
    pub fn range_inclusive(&mut self, lo: u64, hi: u64) -> u64 {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        self.inner.gen_range(lo..=hi)
    }

    /// Roll a float in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape parameter (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }

    /// Pick an index with probability proportional to `weights[i]`.
    /// Falls back to the last index if rounding leaves a remainder.
    pub fn pick_weighted(&mut self, weights: &[f64]) -> usize {
        assert!(!weights.is_empty(), "weights must not be empty");
        let total: f64 = weights.iter().sum();
        let mut roll = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if roll < *w {
                return i;
            }
            roll -= w;
        }
        weights.len() - 1
    }

    /// Draw `amount` distinct indices from [0, length), in draw order.
    pub fn sample_indices(&mut self, length: usize, amount: usize) -> Vec<usize> {
        assert!(amount <= length, "cannot draw {amount} of {length} without replacement");
        rand::seq::index::sample(&mut self.inner, length, amount).into_vec()
    }

    /// Sixteen random bytes, used to mint reproducible UUIDs.
    pub fn next_bytes_16(&mut self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        self.inner.fill_bytes(&mut bytes);
        bytes
    }
}

/// All RNG streams for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_slot(&self, slot: RngSlot) -> SimRng {
        SimRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries. Append only.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Counterparty = 0,
    Behavior = 1,
    Background = 2,
    Structuring = 3,
    Layering = 4,
    HighVelocity = 5,
    Ledger = 6,
    Roster = 7,
    // Add new slots here, at the end.
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Counterparty => "counterparty",
            Self::Behavior => "behavior",
            Self::Background => "background",
            Self::Structuring => "structuring",
            Self::Layering => "layering",
            Self::HighVelocity => "high_velocity",
            Self::Ledger => "ledger",
            Self::Roster => "roster",
        }
    }
}
