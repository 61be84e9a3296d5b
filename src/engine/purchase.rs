//! Conversion of a finished allocation into per-asset token amounts

use alloy_primitives::U256;

use crate::errors::BatchError;
use crate::models::allocation::{AllocationState, PurchaseItem};
use crate::models::asset::AssetConfig;
use crate::models::market::TokenBalances;
use crate::utils::helper::payment_amount;

/// Effective percentages are applied at 1e-6 percent resolution
const PERCENT_SCALE: u64 = 1_000_000;
const FULL_SCALE: u64 = 100 * PERCENT_SCALE;

/// Derives purchase items and the payment amount from a complete allocation
#[derive(Debug, Clone)]
pub struct PurchaseCalculator {
    assets: Vec<AssetConfig>,
    payment_decimals: u8,
}

impl PurchaseCalculator {
    pub fn new(assets: Vec<AssetConfig>, payment_decimals: u8) -> Self {
        Self {
            assets,
            payment_decimals,
        }
    }

    pub fn assets(&self) -> &[AssetConfig] {
        &self.assets
    }

    /// Portion of a raw balance matching an effective percentage
    pub fn token_amount(raw_balance: U256, effective_percent: f64) -> U256 {
        let scaled = (effective_percent.clamp(0.0, 100.0) * PERCENT_SCALE as f64).round() as u64;
        if scaled >= FULL_SCALE {
            return raw_balance;
        }
        match raw_balance.checked_mul(U256::from(scaled)) {
            Some(product) => product / U256::from(FULL_SCALE),
            None => raw_balance / U256::from(FULL_SCALE) * U256::from(scaled),
        }
    }

    /// One item per configured asset, in configuration order.
    ///
    /// Items may carry a zero amount; the batch builder skips those.
    pub fn purchase_items(
        &self,
        state: &AllocationState,
        balances: Option<&TokenBalances>,
        limits: &[f64],
    ) -> Result<Vec<PurchaseItem>, BatchError> {
        if !state.is_complete {
            return Err(BatchError::IncompleteAllocation);
        }

        let items = self
            .assets
            .iter()
            .enumerate()
            .map(|(index, asset)| {
                let effective = state.effective_values.get(index).copied().unwrap_or(0.0);
                let raw_balance = balances
                    .and_then(|b| b.get(&asset.symbol))
                    .unwrap_or(U256::ZERO);
                PurchaseItem::new(
                    asset.clone(),
                    Self::token_amount(raw_balance, effective),
                    state.contribution_usd(index, limits),
                )
            })
            .collect();

        Ok(items)
    }

    /// Raw payment-token amount for a USD target
    pub fn payment_amount(&self, target_usd: f64) -> U256 {
        payment_amount(target_usd, self.payment_decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::{AssetKind, NATIVE_SENTINEL};
    use alloy_primitives::Address;

    fn calculator() -> PurchaseCalculator {
        PurchaseCalculator::new(
            vec![
                AssetConfig::new("ETH", Some(NATIVE_SENTINEL), 8, 18, AssetKind::Native),
                AssetConfig::new("LINK", Some(Address::repeat_byte(0x12)), 8, 18, AssetKind::Utility),
            ],
            6,
        )
    }

    #[test]
    fn amounts_follow_effective_percentages() {
        let mut state = AllocationState::new(2);
        state.slider_values = vec![100.0, 100.0];
        state.effective_values = vec![100.0, 50.0];
        state.total_allocated_usd = 1000.0;
        state.is_complete = true;
        let balances: TokenBalances = [
            ("ETH", U256::from(3_000u64)),
            ("LINK", U256::from(8_000u64)),
        ]
        .into_iter()
        .collect();

        let items = calculator()
            .purchase_items(&state, Some(&balances), &[600.0, 800.0])
            .unwrap();

        assert_eq!(items[0].allocation.token_amount_raw, U256::from(3_000u64));
        assert_eq!(items[1].allocation.token_amount_raw, U256::from(4_000u64));
        assert!((items[1].usd_value - 400.0).abs() < 1e-9);
    }

    #[test]
    fn incomplete_state_is_refused() {
        let state = AllocationState::new(2);
        let err = calculator().purchase_items(&state, None, &[0.0, 0.0]).unwrap_err();
        assert_eq!(err, BatchError::IncompleteAllocation);
    }

    #[test]
    fn fractional_percent_rounds_down_to_units() {
        // 33.3333% of 10 units
        assert_eq!(
            PurchaseCalculator::token_amount(U256::from(10u64), 100.0 / 3.0),
            U256::from(3u64)
        );
        assert_eq!(calculator().payment_amount(12.5), U256::from(12_500_000u64));
    }
}
