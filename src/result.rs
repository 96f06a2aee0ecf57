//! Drop results
//!
//! A result is built once, from the sampled slot and the payout table captured
//! when the drop was requested, and never changes afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tables::RiskLevel;

/// Multiplier used when the payout table has no entry for a slot
pub const MISSING_MULTIPLIER: f64 = 1.0;

/// Largest multiplier any payout table may hold
pub const MAX_MULTIPLIER: f64 = 1000.0;

/// How old a result may be before it is considered stale (1 hour)
pub const MAX_RESULT_AGE_MS: f64 = 60.0 * 60.0 * 1000.0;

/// Why a stored result was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidResult {
    #[error("slot {slot} does not exist on a {rows}-row board")]
    SlotOutOfRange { slot: usize, rows: u32 },
    #[error("result was played on {actual} rows, expected {expected}")]
    RowsMismatch { expected: u32, actual: u32 },
    #[error("multiplier {0} is outside 0..={MAX_MULTIPLIER}")]
    Multiplier(f64),
    #[error("bet {0} is not a positive amount")]
    Bet(f64),
    #[error("timestamp {timestamp_ms} is not within the last hour of {now_ms}")]
    Stale { timestamp_ms: f64, now_ms: f64 },
}

/// Outcome of one completed drop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropResult {
    /// Ticket id of the drop
    pub id: u64,
    pub final_slot: usize,
    /// Lattice path the drop was planned along (`rows + 1` entries)
    pub path: Vec<f32>,
    pub payout_multiplier: f64,
    pub bet: f64,
    pub rows: u32,
    pub risk: RiskLevel,
    /// Unix timestamp (ms) when the ball landed
    pub timestamp_ms: f64,
}

impl DropResult {
    /// Amount paid back for the bet
    pub fn payout(&self) -> f64 {
        self.bet * self.payout_multiplier
    }

    /// Payout minus the stake (negative on a loss)
    pub fn profit(&self) -> f64 {
        self.payout() - self.bet
    }

    pub fn is_win(&self) -> bool {
        self.payout_multiplier > 1.0
    }
}

/// Multiplier for `slot`, or [`MISSING_MULTIPLIER`] when the table is short
pub fn payout_multiplier(payouts: &[f64], slot: usize) -> f64 {
    match payouts.get(slot) {
        Some(&m) if m.is_finite() => m,
        _ => {
            log::debug!("No payout for slot {} ({} entries)", slot, payouts.len());
            MISSING_MULTIPLIER
        }
    }
}

/// Build the result for a landed drop
pub fn compile_result(
    final_slot: usize,
    path: Vec<f32>,
    rows: u32,
    risk: RiskLevel,
    bet: f64,
    payouts: &[f64],
) -> DropResult {
    DropResult {
        id: 0,
        final_slot,
        path,
        payout_multiplier: payout_multiplier(payouts, final_slot),
        bet,
        rows,
        risk,
        timestamp_ms: crate::platform::now_ms(),
    }
}

/// Sanity-check a result (e.g. one restored from history) against the
/// board it claims to come from and the current time.
pub fn validate_result(result: &DropResult, rows: u32, now_ms: f64) -> Result<(), InvalidResult> {
    if result.rows != rows {
        return Err(InvalidResult::RowsMismatch {
            expected: rows,
            actual: result.rows,
        });
    }
    if result.final_slot > rows as usize {
        return Err(InvalidResult::SlotOutOfRange {
            slot: result.final_slot,
            rows,
        });
    }
    let m = result.payout_multiplier;
    if !m.is_finite() || !(0.0..=MAX_MULTIPLIER).contains(&m) {
        return Err(InvalidResult::Multiplier(m));
    }
    if !result.bet.is_finite() || result.bet <= 0.0 {
        return Err(InvalidResult::Bet(result.bet));
    }
    let ts = result.timestamp_ms;
    if !ts.is_finite() || ts < now_ms - MAX_RESULT_AGE_MS || ts > now_ms {
        return Err(InvalidResult::Stale {
            timestamp_ms: ts,
            now_ms,
        });
    }
    Ok(())
}
