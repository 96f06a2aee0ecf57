//! User-edited table overrides
//!
//! Overrides live in a key-value store as JSON blobs (LocalStorage in the
//! browser). The engine only reads them; the admin surface writes them through
//! the `save_*`/`clear_*` helpers here, which validate shape before writing.
//!
//! Layouts:
//! - `customProbabilities`: `{ "<rows>": [percent, ...] }`
//! - `customMultipliers`: `{ "<risk>": { "<rows>": [multiplier, ...] } }`

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::slot_count;
use crate::tables::RiskLevel;

/// Store key for distribution overrides
pub const DISTRIBUTION_KEY: &str = "customProbabilities";
/// Store key for payout overrides
pub const PAYOUT_KEY: &str = "customMultipliers";

type DistributionOverrides = BTreeMap<String, Vec<f64>>;
type PayoutOverrides = BTreeMap<String, BTreeMap<String, Vec<f64>>>;

/// Key-value persistence for override blobs
pub trait OverrideStore {
    /// Raw JSON stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;
    /// Replace the JSON stored under `key`
    fn set(&mut self, key: &str, json: &str);
    /// Drop whatever is stored under `key`
    fn remove(&mut self, key: &str);
}

/// Errors from the override write path
#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("expected {expected} values for {rows} rows, got {actual}")]
    WrongLength {
        rows: u32,
        expected: usize,
        actual: usize,
    },
    #[error("value {value} at index {index} is not a finite non-negative number")]
    InvalidValue { index: usize, value: f64 },
    #[error("could not parse '{0}' as a number")]
    Parse(String),
    #[error("failed to encode overrides: {0}")]
    Encode(#[from] serde_json::Error),
}

/// In-memory store (native hosts, tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OverrideStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, json: &str) {
        self.entries.insert(key.to_string(), json.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Browser LocalStorage store (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl OverrideStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage().and_then(|s| s.get_item(key).ok().flatten())
    }

    fn set(&mut self, key: &str, json: &str) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(key, json).is_err() {
                log::warn!("Failed to write '{}' to LocalStorage", key);
            }
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Check that `values` has one finite, non-negative entry per slot
pub fn validate_table(rows: u32, values: &[f64]) -> Result<(), OverrideError> {
    let expected = slot_count(rows);
    if values.len() != expected {
        return Err(OverrideError::WrongLength {
            rows,
            expected,
            actual: values.len(),
        });
    }
    if let Some((index, &value)) = values
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(OverrideError::InvalidValue { index, value });
    }
    Ok(())
}

fn load_json<T: serde::de::DeserializeOwned, S: OverrideStore + ?Sized>(
    store: &S,
    key: &str,
) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("Ignoring malformed '{}' override: {}", key, e);
            None
        }
    }
}

/// Distribution override for `rows`, if present and well-formed
pub fn distribution_override<S: OverrideStore + ?Sized>(store: &S, rows: u32) -> Option<Vec<f64>> {
    let overrides: DistributionOverrides = load_json(store, DISTRIBUTION_KEY)?;
    let values = overrides.get(&rows.to_string())?;
    accept(rows, values, DISTRIBUTION_KEY)
}

/// Payout override for `(rows, risk)`, if present and well-formed
pub fn payout_override<S: OverrideStore + ?Sized>(
    store: &S,
    rows: u32,
    risk: RiskLevel,
) -> Option<Vec<f64>> {
    let overrides: PayoutOverrides = load_json(store, PAYOUT_KEY)?;
    let values = overrides.get(risk.as_str())?.get(&rows.to_string())?;
    accept(rows, values, PAYOUT_KEY)
}

fn accept(rows: u32, values: &[f64], key: &str) -> Option<Vec<f64>> {
    // An empty array is how the admin page marks "not customised"
    if values.is_empty() {
        return None;
    }
    match validate_table(rows, values) {
        Ok(()) => Some(values.to_vec()),
        Err(e) => {
            log::warn!("Ignoring '{}' override for {} rows: {}", key, rows, e);
            None
        }
    }
}

/// Write a distribution override for `rows`, keeping other row counts
pub fn save_distribution_override<S: OverrideStore + ?Sized>(
    store: &mut S,
    rows: u32,
    values: &[f64],
) -> Result<(), OverrideError> {
    validate_table(rows, values)?;
    let mut overrides: DistributionOverrides =
        load_json(&*store, DISTRIBUTION_KEY).unwrap_or_default();
    overrides.insert(rows.to_string(), values.to_vec());
    let json = serde_json::to_string(&overrides)?;
    store.set(DISTRIBUTION_KEY, &json);
    log::info!("Saved distribution override for {} rows", rows);
    Ok(())
}

/// Write a payout override for `(rows, risk)`, keeping the other entries
pub fn save_payout_override<S: OverrideStore + ?Sized>(
    store: &mut S,
    rows: u32,
    risk: RiskLevel,
    values: &[f64],
) -> Result<(), OverrideError> {
    validate_table(rows, values)?;
    let mut overrides: PayoutOverrides = load_json(&*store, PAYOUT_KEY).unwrap_or_default();
    overrides
        .entry(risk.as_str().to_string())
        .or_default()
        .insert(rows.to_string(), values.to_vec());
    let json = serde_json::to_string(&overrides)?;
    store.set(PAYOUT_KEY, &json);
    log::info!("Saved {} payout override for {} rows", risk.as_str(), rows);
    Ok(())
}

/// Reset every distribution to the built-in tables
pub fn clear_distribution_overrides<S: OverrideStore + ?Sized>(store: &mut S) {
    store.remove(DISTRIBUTION_KEY);
    log::info!("Distribution overrides cleared");
}

/// Reset every payout table to the built-in tables
pub fn clear_payout_overrides<S: OverrideStore + ?Sized>(store: &mut S) {
    store.remove(PAYOUT_KEY);
    log::info!("Payout overrides cleared");
}

/// Rescale percentages so they sum to 100. All-zero input is returned as is.
pub fn normalize_percentages(values: &[f64]) -> Vec<f64> {
    let sum: f64 = values.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return values.to_vec();
    }
    values
        .iter()
        .map(|v| v / sum * crate::consts::PERCENT_SCALE)
        .collect()
}

/// Parse a comma-separated list of `rows + 1` numbers (admin batch entry)
pub fn parse_batch(rows: u32, input: &str) -> Result<Vec<f64>, OverrideError> {
    let values = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().map_err(|_| OverrideError::Parse(s.to_string())))
        .collect::<Result<Vec<_>, _>>()?;
    validate_table(rows, &values)?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_override_is_none() {
        let store = MemoryStore::new();
        assert!(distribution_override(&store, 8).is_none());
        assert!(payout_override(&store, 8, RiskLevel::High).is_none());
    }

    #[test]
    fn test_malformed_json_is_ignored() {
        let mut store = MemoryStore::new();
        store.set(DISTRIBUTION_KEY, "{not json");
        store.set(PAYOUT_KEY, "[1, 2, 3]");
        assert!(distribution_override(&store, 8).is_none());
        assert!(payout_override(&store, 8, RiskLevel::Low).is_none());
    }

    #[test]
    fn test_wrong_length_is_ignored() {
        let mut store = MemoryStore::new();
        store.set(DISTRIBUTION_KEY, r#"{"8": [50, 50]}"#);
        assert!(distribution_override(&store, 8).is_none());
    }

    #[test]
    fn test_reads_javascript_layout() {
        let mut store = MemoryStore::new();
        store.set(
            PAYOUT_KEY,
            r#"{"medium": {"8": [1, 1, 1, 1, 9, 1, 1, 1, 1]}}"#,
        );
        let values = payout_override(&store, 8, RiskLevel::Medium).unwrap();
        assert_eq!(values[4], 9.0);
        assert!(payout_override(&store, 8, RiskLevel::Low).is_none());
        assert!(payout_override(&store, 9, RiskLevel::Medium).is_none());
    }

    #[test]
    fn test_save_keeps_other_rows() {
        let mut store = MemoryStore::new();
        save_distribution_override(&mut store, 8, &[1.0; 9]).unwrap();
        save_distribution_override(&mut store, 9, &[2.0; 10]).unwrap();
        assert_eq!(distribution_override(&store, 8).unwrap(), vec![1.0; 9]);
        assert_eq!(distribution_override(&store, 9).unwrap(), vec![2.0; 10]);

        clear_distribution_overrides(&mut store);
        assert!(distribution_override(&store, 8).is_none());
    }

    #[test]
    fn test_save_rejects_bad_tables() {
        let mut store = MemoryStore::new();
        let err = save_payout_override(&mut store, 8, RiskLevel::Low, &[1.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            OverrideError::WrongLength {
                expected: 9,
                actual: 3,
                ..
            }
        ));

        let mut values = vec![1.0; 9];
        values[2] = -1.0;
        let err = save_payout_override(&mut store, 8, RiskLevel::Low, &values).unwrap_err();
        assert!(matches!(err, OverrideError::InvalidValue { index: 2, .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_over_malformed_blob_replaces_it() {
        let mut store = MemoryStore::new();
        store.set(PAYOUT_KEY, "garbage");
        save_payout_override(&mut store, 8, RiskLevel::High, &[2.0; 9]).unwrap();
        assert_eq!(
            payout_override(&store, 8, RiskLevel::High).unwrap(),
            vec![2.0; 9]
        );
    }

    #[test]
    fn test_normalize_percentages() {
        let normalized = normalize_percentages(&[1.0, 1.0, 2.0]);
        assert!((normalized.iter().sum::<f64>() - 100.0).abs() < 1e-9);
        assert!((normalized[2] - 50.0).abs() < 1e-9);
        assert_eq!(normalize_percentages(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_parse_batch() {
        let values = parse_batch(8, "1, 2,3,4 ,5,6,7,8,9").unwrap();
        assert_eq!(values.len(), 9);
        assert!(matches!(
            parse_batch(8, "1,2,x"),
            Err(OverrideError::Parse(_))
        ));
        assert!(matches!(
            parse_batch(8, "1,2,3"),
            Err(OverrideError::WrongLength { .. })
        ));
    }
}
