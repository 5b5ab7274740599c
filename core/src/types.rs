//! Shared primitive types used across the entire engine.

/// A simulated month. Month 0 is the first month of the campaign.
pub type Month = u32;

/// Zero-based index of a trial within a Monte Carlo campaign.
pub type TrialIndex = u64;
