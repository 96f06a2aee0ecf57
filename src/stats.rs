//! Session statistics over landed drops
//!
//! Slices are in landing order (oldest first).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::result::DropResult;

/// Totals for a run of drops
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultStats {
    pub drops: usize,
    /// Sum of stakes
    pub total_bets: f64,
    pub total_payout: f64,
    pub total_profit: f64,
    /// Share of drops that returned more than the stake
    pub win_rate: f64,
    /// Largest single profit (0 when nothing won)
    pub biggest_win: f64,
    /// Most negative single profit (0 when nothing lost)
    pub biggest_loss: f64,
    pub average_multiplier: f64,
    /// Landing count per slot
    pub slot_distribution: BTreeMap<usize, usize>,
}

impl ResultStats {
    pub fn from_results(results: &[DropResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            drops: results.len(),
            ..Self::default()
        };
        let mut wins = 0usize;
        let mut multipliers = 0.0;

        for result in results {
            let profit = result.profit();
            stats.total_bets += result.bet;
            stats.total_payout += result.payout();
            stats.total_profit += profit;
            multipliers += result.payout_multiplier;

            if profit > 0.0 {
                wins += 1;
                stats.biggest_win = stats.biggest_win.max(profit);
            } else {
                stats.biggest_loss = stats.biggest_loss.min(profit);
            }
            *stats.slot_distribution.entry(result.final_slot).or_insert(0) += 1;
        }

        stats.win_rate = wins as f64 / results.len() as f64;
        stats.average_multiplier = multipliers / results.len() as f64;
        stats
    }
}

/// Win and loss streaks. A drop that breaks even counts toward a win streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    /// Consecutive non-losing drops ending at the latest one
    pub current_win: usize,
    /// Consecutive losing drops ending at the latest one
    pub current_loss: usize,
    pub longest_win: usize,
    pub longest_loss: usize,
}

impl Streaks {
    pub fn from_results(results: &[DropResult]) -> Self {
        let mut streaks = Self::default();
        let (mut wins, mut losses) = (0usize, 0usize);

        for result in results {
            if result.profit() >= 0.0 {
                wins += 1;
                losses = 0;
                streaks.longest_win = streaks.longest_win.max(wins);
            } else {
                losses += 1;
                wins = 0;
                streaks.longest_loss = streaks.longest_loss.max(losses);
            }
        }

        // The running counters are the streak still open at the end
        streaks.current_win = wins;
        streaks.current_loss = losses;
        streaks
    }
}

/// Results kept for the history panel
pub const HISTORY_LIMIT: usize = 100;

/// Most recent landed drops, oldest first, capped at a fixed length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    results: Vec<DropResult>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl History {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            results: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, result: DropResult) {
        self.results.push(result);
        if self.results.len() > self.limit {
            let excess = self.results.len() - self.limit;
            self.results.drain(..excess);
        }
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = DropResult>) {
        for result in results {
            self.push(result);
        }
    }

    pub fn results(&self) -> &[DropResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn stats(&self) -> ResultStats {
        ResultStats::from_results(&self.results)
    }

    pub fn streaks(&self) -> Streaks {
        Streaks::from_results(&self.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::RiskLevel;

    fn landed(slot: usize, bet: f64, multiplier: f64) -> DropResult {
        DropResult {
            id: 0,
            final_slot: slot,
            path: Vec::new(),
            payout_multiplier: multiplier,
            bet,
            rows: 8,
            risk: RiskLevel::Medium,
            timestamp_ms: 0.0,
        }
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(ResultStats::from_results(&[]), ResultStats::default());
        assert_eq!(Streaks::from_results(&[]), Streaks::default());
    }

    #[test]
    fn test_stats_totals() {
        let results = [
            landed(0, 2.0, 5.0),
            landed(4, 2.0, 0.5),
            landed(4, 1.0, 0.2),
            landed(2, 1.0, 1.0),
        ];
        let stats = ResultStats::from_results(&results);
        assert_eq!(stats.drops, 4);
        assert!((stats.total_bets - 6.0).abs() < 1e-9);
        assert!((stats.total_payout - 12.2).abs() < 1e-9);
        assert!((stats.total_profit - 6.2).abs() < 1e-9);
        // Breaking even is not a win
        assert!((stats.win_rate - 0.25).abs() < 1e-9);
        assert!((stats.biggest_win - 8.0).abs() < 1e-9);
        assert!((stats.biggest_loss - (-1.0)).abs() < 1e-9);
        assert!((stats.average_multiplier - 1.675).abs() < 1e-9);
        assert_eq!(stats.slot_distribution.get(&4), Some(&2));
        assert_eq!(stats.slot_distribution.get(&0), Some(&1));
        assert_eq!(stats.slot_distribution.get(&7), None);
    }

    #[test]
    fn test_streaks() {
        let win = || landed(0, 1.0, 2.0);
        let lose = || landed(4, 1.0, 0.5);
        let even = || landed(3, 1.0, 1.0);

        let results = [win(), win(), even(), lose(), lose(), lose(), win(), lose(), lose()];
        let streaks = Streaks::from_results(&results);
        assert_eq!(streaks.longest_win, 3);
        assert_eq!(streaks.longest_loss, 3);
        assert_eq!(streaks.current_win, 0);
        assert_eq!(streaks.current_loss, 2);

        let streaks = Streaks::from_results(&[lose(), win(), even()]);
        assert_eq!(streaks.current_win, 2);
        assert_eq!(streaks.current_loss, 0);
        assert_eq!(streaks.longest_loss, 1);
    }

    #[test]
    fn test_history_keeps_latest() {
        let mut history = History::with_limit(3);
        history.extend((0..5).map(|slot| landed(slot, 1.0, 2.0)));
        assert_eq!(history.len(), 3);
        let slots: Vec<usize> = history.results().iter().map(|r| r.final_slot).collect();
        assert_eq!(slots, vec![2, 3, 4]);
        assert_eq!(history.stats().drops, 3);
        assert_eq!(history.streaks().current_win, 3);

        history.clear();
        assert!(history.is_empty());
        assert_eq!(History::default().limit, HISTORY_LIMIT);
    }
}
