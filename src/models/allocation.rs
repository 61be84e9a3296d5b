use alloy_primitives::U256;

use super::asset::AssetConfig;

/// Result of one allocation step, owned by the front end.
///
/// Never mutated in place: every engine call returns a fresh value that the
/// caller passes into the next call.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationState {
    /// Raw user intent per asset, integers in `0..=100`
    pub slider_values: Vec<f64>,
    /// Share of each ceiling that actually counts toward the target
    pub effective_values: Vec<f64>,
    pub total_allocated_usd: f64,
    pub is_complete: bool,
    /// Asset whose contribution currently closes the gap to the target
    pub active_slider: Option<usize>,
}

impl AllocationState {
    /// Zeroed state for `asset_count` assets
    pub fn new(asset_count: usize) -> Self {
        Self {
            slider_values: vec![0.0; asset_count],
            effective_values: vec![0.0; asset_count],
            total_allocated_usd: 0.0,
            is_complete: false,
            active_slider: None,
        }
    }

    pub fn asset_count(&self) -> usize {
        self.slider_values.len()
    }

    /// USD contributed by one asset under the given ceilings
    pub fn contribution_usd(&self, index: usize, limits: &[f64]) -> f64 {
        let effective = self.effective_values.get(index).copied().unwrap_or(0.0);
        let limit = limits.get(index).copied().unwrap_or(0.0);
        effective / 100.0 * limit
    }

    /// Check if every slider sits at zero
    pub fn is_empty(&self) -> bool {
        self.slider_values.iter().all(|v| *v == 0.0)
    }
}

/// Amount of one asset to spend, derived from a complete allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAllocation {
    pub token_amount_raw: U256,
}

/// One asset and the amount of it committed to the purchase
#[derive(Debug, Clone)]
pub struct PurchaseItem {
    pub asset: AssetConfig,
    pub allocation: TokenAllocation,
    pub usd_value: f64,
}

impl PurchaseItem {
    pub fn new(asset: AssetConfig, token_amount_raw: U256, usd_value: f64) -> Self {
        Self {
            asset,
            allocation: TokenAllocation { token_amount_raw },
            usd_value,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.allocation.token_amount_raw.is_zero()
    }
}
