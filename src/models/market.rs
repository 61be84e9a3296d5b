use std::collections::HashMap;

use alloy_primitives::U256;
use chrono::{DateTime, Utc};

/// Raw fixed-point amounts keyed by asset symbol.
///
/// Each value is scaled by the decimal count the matching
/// [`AssetConfig`](super::asset::AssetConfig) declares for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAmounts(HashMap<String, U256>);

impl RawAmounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, raw: U256) {
        self.0.insert(symbol.into(), raw);
    }

    pub fn get(&self, symbol: &str) -> Option<U256> {
        self.0.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &U256)> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, U256)> for RawAmounts {
    fn from_iter<I: IntoIterator<Item = (S, U256)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(s, v)| (s.into(), v)).collect())
    }
}

/// USD prices, scaled by each asset's price-feed decimals
pub type TokenPrices = RawAmounts;

/// Wallet balances, scaled by each asset's token decimals
pub type TokenBalances = RawAmounts;

/// Prices and balances as observed at one refresh.
///
/// `None` on either side means the feed failed for that refresh; the
/// allocation engine then sees zero ceilings.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub timestamp: DateTime<Utc>,
    pub prices: Option<TokenPrices>,
    pub balances: Option<TokenBalances>,
    /// Per-asset USD ceilings, in asset configuration order
    pub limits: Vec<f64>,
}

impl MarketSnapshot {
    /// Create a new snapshot
    pub fn new(
        prices: Option<TokenPrices>,
        balances: Option<TokenBalances>,
        limits: Vec<f64>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            prices,
            balances,
            limits,
        }
    }

    /// Check if both feeds delivered data
    pub fn is_available(&self) -> bool {
        self.prices.is_some() && self.balances.is_some()
    }

    /// Sum of all ceilings
    pub fn total_limit_usd(&self) -> f64 {
        self.limits.iter().sum()
    }

    /// Compare ceilings with an older snapshot
    pub fn diff(&self, older: &MarketSnapshot, symbols: &[String]) -> MarketDiff {
        let mut diff = MarketDiff {
            availability_changed: self.is_available() != older.is_available(),
            changes: Vec::new(),
        };

        for (index, symbol) in symbols.iter().enumerate() {
            let old = older.limits.get(index).copied().unwrap_or(0.0);
            let new = self.limits.get(index).copied().unwrap_or(0.0);
            if (new - old).abs() > f64::EPSILON {
                diff.changes.push(LimitChange::new(index, symbol.clone(), old, new));
            }
        }

        diff
    }
}

/// Difference between two market snapshots
#[derive(Debug, Default, Clone)]
pub struct MarketDiff {
    pub availability_changed: bool,
    pub changes: Vec<LimitChange>,
}

impl MarketDiff {
    /// Check if there are any changes
    pub fn is_empty(&self) -> bool {
        !self.availability_changed && self.changes.is_empty()
    }
}

/// Change of one asset's USD ceiling between refreshes
#[derive(Debug, Clone)]
pub struct LimitChange {
    pub index: usize,
    pub symbol: String,
    pub old_limit_usd: f64,
    pub new_limit_usd: f64,
    pub change: f64,
    pub percentage_change: f64,
}

impl LimitChange {
    pub fn new(index: usize, symbol: String, old_limit_usd: f64, new_limit_usd: f64) -> Self {
        let change = new_limit_usd - old_limit_usd;
        let percentage_change = if old_limit_usd > 0.0 {
            (change / old_limit_usd) * 100.0
        } else {
            100.0
        };

        Self {
            index,
            symbol,
            old_limit_usd,
            new_limit_usd,
            change,
            percentage_change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_reports_only_moved_ceilings() {
        let symbols = vec!["ETH".to_string(), "LINK".to_string()];
        let old = MarketSnapshot::new(Some(RawAmounts::new()), Some(RawAmounts::new()), vec![100.0, 50.0]);
        let new = MarketSnapshot::new(Some(RawAmounts::new()), Some(RawAmounts::new()), vec![100.0, 75.0]);

        let diff = new.diff(&old, &symbols);

        assert!(!diff.availability_changed);
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].symbol, "LINK");
        assert!((diff.changes[0].percentage_change - 50.0).abs() < 1e-9);
    }

    #[test]
    fn diff_flags_feed_outage() {
        let symbols = vec!["ETH".to_string()];
        let old = MarketSnapshot::new(Some(RawAmounts::new()), Some(RawAmounts::new()), vec![10.0]);
        let new = MarketSnapshot::new(None, Some(RawAmounts::new()), vec![0.0]);

        let diff = new.diff(&old, &symbols);

        assert!(diff.availability_changed);
        assert!(!diff.is_empty());
    }
}
