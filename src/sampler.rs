//! Outcome sampling
//!
//! The landing slot is decided here, before any path or animation exists.

use crate::consts::PERCENT_SCALE;
use crate::rng::RandomSource;

/// Slot selected by a roll on the percent scale.
///
/// Walks the distribution accumulating a running sum and returns the first
/// index whose sum reaches `roll`. When the table sums to less than `roll`
/// (rounding in the percentages) the last slot is returned.
pub fn slot_for_roll(distribution: &[f64], roll: f64) -> usize {
    let mut cumulative = 0.0;
    for (slot, weight) in distribution.iter().enumerate() {
        cumulative += weight;
        if *weight > 0.0 && cumulative >= roll {
            return slot;
        }
    }
    distribution.len().saturating_sub(1)
}

/// Draw a landing slot from `distribution` (percent weights)
pub fn sample_slot<R: RandomSource + ?Sized>(distribution: &[f64], rng: &mut R) -> usize {
    let roll = rng.next_unit() * PERCENT_SCALE;
    let slot = slot_for_roll(distribution, roll);
    log::debug!("Sampled slot {} (roll {:.4})", slot, roll);
    slot
}
