//! Drop distributions and payout tables
//!
//! Built-in tables cover 8..=16 rows. Lookups consult the injected
//! [`OverrideStore`] first and fall back to the built-ins, then to a
//! synthesized table for row counts with no built-in data. Nothing is cached:
//! every lookup reads the store, so an admin edit applies to the next drop.

use serde::{Deserialize, Serialize};

use crate::overrides::{self, OverrideStore};
use crate::slot_count;

/// Payout volatility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" | "med" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

/// Built-in drop probabilities in percent, indexed by slot
pub fn builtin_distribution(rows: u32) -> Option<&'static [f64]> {
    let table: &'static [f64] = match rows {
        8 => &[0.39, 3.13, 10.94, 21.88, 27.34, 21.88, 10.94, 3.13, 0.39],
        9 => &[
            0.1953, 1.7578, 7.0313, 16.4063, 24.6094, 24.6094, 16.4063, 7.0313, 1.7578, 0.1953,
        ],
        10 => &[
            0.0977, 0.9766, 4.3945, 11.7188, 20.5078, 24.6094, 20.5078, 11.7188, 4.3945, 0.9766,
            0.0977,
        ],
        11 => &[
            0.0488, 0.5371, 2.6855, 8.0566, 16.1133, 22.5586, 22.5586, 16.1133, 8.0566, 2.6855,
            0.5371, 0.0488,
        ],
        12 => &[
            0.0244, 0.2930, 1.6113, 5.3711, 12.0850, 19.3359, 22.5586, 19.3359, 12.0850, 5.3711,
            1.6113, 0.2930, 0.0244,
        ],
        13 => &[
            0.0122, 0.1587, 0.9521, 3.4912, 8.7280, 15.7104, 20.9473, 20.9473, 15.7104, 8.7280,
            3.4912, 0.9521, 0.1587, 0.0122,
        ],
        14 => &[
            0.0061, 0.0854, 0.5554, 2.2217, 6.1096, 12.2192, 18.3289, 20.9473, 18.3289, 12.2192,
            6.1096, 2.2217, 0.5554, 0.0854, 0.0061,
        ],
        15 => &[
            0.0031, 0.0458, 0.3204, 1.3885, 4.1656, 9.1644, 15.2740, 19.6381, 19.6381, 15.2740,
            9.1644, 4.1656, 1.3885, 0.3204, 0.0458, 0.0031,
        ],
        16 => &[
            0.0015, 0.0244, 0.1831, 0.8545, 2.7771, 6.6650, 12.2192, 17.4561, 19.6381, 17.4561,
            12.2192, 6.6650, 2.7771, 0.8545, 0.1831, 0.0244, 0.0015,
        ],
        _ => return None,
    };
    Some(table)
}

/// Built-in payout multipliers, indexed by slot
pub fn builtin_payouts(rows: u32, risk: RiskLevel) -> Option<&'static [f64]> {
    use RiskLevel::*;
    let table: &'static [f64] = match (rows, risk) {
        (8, Low) => &[5.6, 2.1, 1.1, 1.0, 0.5, 1.0, 1.1, 2.1, 5.6],
        (8, Medium) => &[13.0, 3.0, 1.3, 0.7, 0.4, 0.7, 1.3, 3.0, 13.0],
        (8, High) => &[29.0, 4.0, 1.5, 0.3, 0.2, 0.3, 1.5, 4.0, 29.0],

        (9, Low) => &[5.6, 2.0, 1.6, 1.0, 0.7, 0.7, 1.0, 1.6, 2.0, 5.6],
        (9, Medium) => &[18.0, 4.0, 1.7, 0.97, 0.5, 0.5, 0.9, 1.7, 4.0, 18.0],
        (9, High) => &[43.0, 7.0, 2.0, 0.6, 0.2, 0.2, 0.6, 2.0, 7.0, 43.0],

        (10, Low) => &[8.9, 3.0, 1.4, 1.1, 1.0, 0.5, 1.0, 1.1, 1.4, 3.0, 8.9],
        (10, Medium) => &[22.0, 5.0, 2.0, 1.4, 0.6, 0.4, 0.6, 1.4, 2.0, 5.0, 22.0],
        (10, High) => &[76.0, 10.0, 3.0, 0.9, 0.3, 0.2, 0.3, 0.9, 3.0, 10.0, 76.0],

        (11, Low) => &[8.4, 3.0, 1.9, 1.3, 1.0, 0.7, 0.7, 1.0, 1.3, 1.9, 3.0, 8.4],
        (11, Medium) => &[24.0, 6.0, 3.0, 1.8, 0.7, 0.5, 0.5, 0.7, 1.8, 3.0, 6.0, 24.0],
        (11, High) => &[120.0, 14.0, 5.2, 1.4, 0.4, 0.2, 0.2, 0.4, 1.4, 5.2, 14.0, 120.0],

        (12, Low) => &[10.0, 3.0, 1.6, 1.4, 1.1, 1.0, 0.5, 1.0, 1.1, 1.4, 1.6, 3.0, 10.0],
        (12, Medium) => &[33.0, 11.0, 4.0, 2.0, 1.1, 0.6, 0.3, 0.6, 1.1, 2.0, 4.0, 11.0, 33.0],
        (12, High) => &[170.0, 24.0, 8.1, 2.0, 0.7, 0.2, 0.2, 0.2, 0.7, 2.0, 8.1, 24.0, 170.0],

        (13, Low) => &[8.1, 4.0, 3.0, 1.9, 1.2, 0.9, 0.7, 0.7, 0.9, 1.2, 1.9, 3.0, 4.0, 8.1],
        (13, Medium) => &[
            43.0, 13.0, 6.0, 3.0, 1.3, 0.7, 0.4, 0.4, 0.7, 1.3, 3.0, 6.0, 13.0, 43.0,
        ],
        (13, High) => &[
            260.0, 37.0, 11.0, 4.0, 1.0, 0.2, 0.2, 0.2, 0.2, 1.0, 4.0, 11.0, 37.0, 260.0,
        ],

        (14, Low) => &[
            7.1, 4.0, 1.9, 1.4, 1.3, 1.1, 1.0, 0.5, 1.0, 1.1, 1.3, 1.4, 1.9, 4.0, 7.1,
        ],
        (14, Medium) => &[
            58.0, 15.0, 7.0, 4.0, 1.9, 1.0, 0.5, 0.2, 0.5, 1.0, 1.9, 4.0, 7.0, 15.0, 58.0,
        ],
        (14, High) => &[
            420.0, 56.0, 18.0, 5.0, 1.9, 0.3, 0.2, 0.2, 0.2, 0.3, 1.9, 5.0, 18.0, 56.0, 420.0,
        ],

        (15, Low) => &[
            15.0, 8.0, 3.0, 2.0, 1.5, 1.1, 1.0, 0.7, 0.7, 1.0, 1.1, 1.5, 2.0, 3.0, 8.0, 15.0,
        ],
        (15, Medium) => &[
            88.0, 18.0, 11.0, 5.0, 3.0, 1.3, 0.5, 0.3, 0.3, 0.5, 1.3, 3.0, 5.0, 11.0, 18.0, 88.0,
        ],
        (15, High) => &[
            620.0, 83.0, 27.0, 8.0, 3.0, 0.5, 0.2, 0.2, 0.2, 0.2, 0.5, 3.0, 8.0, 27.0, 83.0, 620.0,
        ],

        (16, Low) => &[
            16.0, 9.0, 2.0, 1.4, 1.4, 1.2, 1.1, 1.0, 0.5, 1.0, 1.1, 1.2, 1.4, 1.4, 2.0, 9.0, 16.0,
        ],
        (16, Medium) => &[
            110.0, 41.0, 10.0, 5.0, 3.0, 1.5, 1.0, 0.5, 0.3, 0.5, 1.0, 1.5, 3.0, 5.0, 10.0, 41.0,
            110.0,
        ],
        (16, High) => &[
            1000.0, 130.0, 26.0, 9.0, 4.0, 2.0, 0.2, 0.2, 0.2, 0.2, 0.2, 2.0, 4.0, 9.0, 26.0,
            130.0, 1000.0,
        ],

        _ => return None,
    };
    Some(table)
}

/// Equal weight for every slot (row counts with no built-in distribution)
pub fn uniform_distribution(rows: u32) -> Vec<f64> {
    let slots = slot_count(rows);
    vec![crate::consts::PERCENT_SCALE / slots as f64; slots]
}

/// Symmetric falloff from the center slot (row counts with no payout table)
pub fn falloff_payouts(rows: u32) -> Vec<f64> {
    let slots = slot_count(rows);
    let center = slots / 2;
    (0..slots)
        .map(|i| {
            let distance = i.abs_diff(center) as f64;
            (2.0 - distance * 0.3).max(0.1)
        })
        .collect()
}

/// Tables for one drop, read once when the drop is requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub rows: u32,
    pub risk: RiskLevel,
    pub distribution: Vec<f64>,
    pub payouts: Vec<f64>,
}

/// Table lookups backed by an override store
#[derive(Debug, Clone, Default)]
pub struct TableProvider<S> {
    store: S,
}

impl<S: OverrideStore> TableProvider<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access for the admin write path
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Drop probabilities (percent) for `rows`
    pub fn distribution(&self, rows: u32) -> Vec<f64> {
        if let Some(values) = overrides::distribution_override(&self.store, rows) {
            return values;
        }
        match builtin_distribution(rows) {
            Some(table) if table.len() == slot_count(rows) => table.to_vec(),
            _ => {
                log::debug!("No distribution for {} rows, using uniform", rows);
                uniform_distribution(rows)
            }
        }
    }

    /// Payout multipliers for `(rows, risk)`
    pub fn payouts(&self, rows: u32, risk: RiskLevel) -> Vec<f64> {
        if let Some(values) = overrides::payout_override(&self.store, rows, risk) {
            return values;
        }
        match builtin_payouts(rows, risk) {
            Some(table) if table.len() == slot_count(rows) => table.to_vec(),
            _ => {
                log::debug!("No {} payouts for {} rows, using falloff", risk.as_str(), rows);
                falloff_payouts(rows)
            }
        }
    }

    /// Both tables for one drop
    pub fn snapshot(&self, rows: u32, risk: RiskLevel) -> TableSnapshot {
        TableSnapshot {
            rows,
            risk,
            distribution: self.distribution(rows),
            payouts: self.payouts(rows, risk),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{MemoryStore, save_distribution_override, save_payout_override};

    #[test]
    fn test_builtin_shapes() {
        for rows in 8..=16 {
            let dist = builtin_distribution(rows).unwrap();
            assert_eq!(dist.len(), slot_count(rows), "distribution rows={}", rows);
            let sum: f64 = dist.iter().sum();
            assert!((sum - 100.0).abs() < 0.1, "rows={} sum={}", rows, sum);

            for risk in RiskLevel::ALL {
                let payouts = builtin_payouts(rows, risk).unwrap();
                assert_eq!(payouts.len(), slot_count(rows), "{:?} rows={}", risk, rows);
                assert!(payouts.iter().all(|p| *p >= 0.0));
            }
        }
    }

    #[test]
    fn test_twelve_rows_is_binomial() {
        let dist = builtin_distribution(12).unwrap();
        let mut choose = 1.0f64;
        for (k, value) in dist.iter().enumerate() {
            let expected = choose / 4096.0 * 100.0;
            assert!((value - expected).abs() < 1e-4, "slot {} is {} not {}", k, value, expected);
            choose = choose * (12 - k) as f64 / (k + 1) as f64;
        }
    }

    #[test]
    fn test_builtin_distributions_symmetric() {
        for rows in 8..=16 {
            let dist = builtin_distribution(rows).unwrap();
            for i in 0..dist.len() {
                assert!((dist[i] - dist[dist.len() - 1 - i]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_unknown_rows_fall_back() {
        let provider = TableProvider::new(MemoryStore::new());
        let dist = provider.distribution(20);
        assert_eq!(dist.len(), 21);
        assert!(dist.iter().all(|p| (*p - 100.0 / 21.0).abs() < 1e-9));

        let payouts = provider.payouts(4, RiskLevel::High);
        let expected = [1.4, 1.7, 2.0, 1.7, 1.4];
        assert_eq!(payouts.len(), expected.len());
        for (got, want) in payouts.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn test_falloff_floor() {
        let payouts = falloff_payouts(30);
        assert!(payouts.iter().all(|p| *p >= 0.1));
        assert_eq!(payouts[0], 0.1);
    }

    #[test]
    fn test_override_shadows_builtin() {
        let mut provider = TableProvider::new(MemoryStore::new());
        let custom = vec![0.0, 0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0, 0.0];
        save_distribution_override(provider.store_mut(), 8, &custom).unwrap();
        assert_eq!(provider.distribution(8), custom);
        assert_eq!(provider.distribution(9), builtin_distribution(9).unwrap());

        let payouts = vec![3.0; 9];
        save_payout_override(provider.store_mut(), 8, RiskLevel::Low, &payouts).unwrap();
        assert_eq!(provider.payouts(8, RiskLevel::Low), payouts);
        assert_eq!(
            provider.payouts(8, RiskLevel::High),
            builtin_payouts(8, RiskLevel::High).unwrap()
        );
    }

    #[test]
    fn test_payouts_idempotent() {
        let provider = TableProvider::new(MemoryStore::new());
        for rows in 8..=16 {
            for risk in RiskLevel::ALL {
                assert_eq!(provider.payouts(rows, risk), provider.payouts(rows, risk));
            }
        }
    }

    #[test]
    fn test_risk_level_strings() {
        for risk in RiskLevel::ALL {
            assert_eq!(RiskLevel::from_str(risk.as_str()), Some(risk));
        }
        assert_eq!(RiskLevel::from_str("MED"), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::from_str("extreme"), None);
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"high\"");
    }
}
