//! Deterministic random number generation.
//!
//! RULE: Nothing in the engine may call any platform RNG.
//! All randomness flows through a TrialRng handed explicitly to
//! every cost and demand model call.
//!
//! Each trial gets its own stream, seeded deterministically from
//! (master_seed XOR mixed trial_index). This means:
//!   - Trial i draws the same numbers no matter which thread runs it.
//!   - Adding trials to a campaign never changes existing trials.

use rand::SeedableRng;
use rand_distr::{Binomial, Distribution, Normal};
use rand_pcg::Pcg64Mcg;

use crate::types::TrialIndex;

/// A deterministic RNG owned by exactly one trial.
pub struct TrialRng {
    pub trial_index: TrialIndex,
    pub seed:        u64,
    inner:           Pcg64Mcg,
}

impl TrialRng {
    /// Create a trial RNG from the master seed and the trial index.
    pub fn new(master_seed: u64, trial_index: TrialIndex) -> Self {
        let seed = derive_seed(master_seed, trial_index);
        Self {
            trial_index,
            seed,
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Sample N(mean, std_dev). A negative or NaN std_dev yields the mean.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        // Normal::new accepts a negative std_dev and mirrors the draw.
        if std_dev.is_nan() || std_dev < 0.0 {
            return mean;
        }
        match Normal::new(mean, std_dev) {
            Ok(dist) => dist.sample(&mut self.inner),
            Err(_) => mean,
        }
    }

    /// Sample N(mean, std_dev) clamped to [lo, hi].
    pub fn normal_clamped(&mut self, mean: f64, std_dev: f64, lo: f64, hi: f64) -> f64 {
        self.normal(mean, std_dev).clamp(lo, hi)
    }

    /// Number of successes in `trials` Bernoulli(p) draws.
    /// p is clamped into [0, 1]; a non-finite p counts as 0.
    pub fn binomial(&mut self, trials: u64, p: f64) -> u64 {
        if trials == 0 {
            return 0;
        }
        let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
        match Binomial::new(trials, p) {
            Ok(dist) => dist.sample(&mut self.inner),
            Err(_) => 0,
        }
    }
}

/// Hands out one TrialRng per trial index for a campaign.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_trial(&self, trial_index: TrialIndex) -> TrialRng {
        TrialRng::new(self.master_seed, trial_index)
    }
}

fn derive_seed(master_seed: u64, trial_index: TrialIndex) -> u64 {
    master_seed ^ trial_index.wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_index_same_stream() {
        let bank = RngBank::new(7);
        let mut a = bank.for_trial(3);
        let mut b = bank.for_trial(3);
        for _ in 0..32 {
            assert_eq!(a.normal(0.0, 1.0).to_bits(), b.normal(0.0, 1.0).to_bits());
        }
    }

    #[test]
    fn distinct_indices_get_distinct_seeds() {
        let bank = RngBank::new(0);
        assert_ne!(bank.for_trial(1).seed, bank.for_trial(2).seed);
    }

    #[test]
    fn binomial_edges() {
        let mut rng = TrialRng::new(1, 0);
        assert_eq!(rng.binomial(0, 0.5), 0);
        assert_eq!(rng.binomial(40, 0.0), 0);
        assert_eq!(rng.binomial(40, 1.0), 40);
        assert_eq!(rng.binomial(40, f64::NAN), 0);
        assert!(rng.binomial(40, 7.0) <= 40);
    }

    #[test]
    fn zero_std_normal_is_the_mean() {
        let mut rng = TrialRng::new(1, 0);
        assert_eq!(rng.normal(2.5, 0.0), 2.5);
        assert_eq!(rng.normal(2.5, -1.0), 2.5);
        assert_eq!(rng.normal(2.5, f64::NAN), 2.5);
    }

    #[test]
    fn negative_std_never_moves_the_draw() {
        let mut rng = TrialRng::new(9, 4);
        for _ in 0..64 {
            assert_eq!(rng.normal(-3.0, -0.5), -3.0);
            assert_eq!(rng.normal_clamped(0.9, -2.0, 0.0, 1.0), 0.9);
        }
    }
}
