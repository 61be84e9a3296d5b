//! Balance-derived USD ceilings per asset

use alloy_primitives::U256;

use crate::models::asset::AssetConfig;
use crate::models::market::{TokenBalances, TokenPrices};
use crate::utils::helper::from_units;

/// Wallet balance in whole tokens
pub fn balance_in_token_units(raw_balance: U256, token_decimals: u8) -> f64 {
    from_units(raw_balance, token_decimals)
}

/// Price in USD per whole token
pub fn price_in_usd(raw_price: U256, price_decimals: u8) -> f64 {
    from_units(raw_price, price_decimals)
}

/// USD ceiling of one asset, zero when either side is missing
pub fn token_limit_usd(
    asset: &AssetConfig,
    prices: Option<&TokenPrices>,
    balances: Option<&TokenBalances>,
) -> f64 {
    let (Some(prices), Some(balances)) = (prices, balances) else {
        return 0.0;
    };
    let (Some(raw_price), Some(raw_balance)) =
        (prices.get(&asset.symbol), balances.get(&asset.symbol))
    else {
        return 0.0;
    };

    let limit = balance_in_token_units(raw_balance, asset.token_decimals)
        * price_in_usd(raw_price, asset.price_feed_decimals);

    if limit.is_finite() && limit > 0.0 {
        limit
    } else {
        0.0
    }
}

/// USD ceilings for every asset, in configuration order
pub fn compute_token_limits(
    assets: &[AssetConfig],
    prices: Option<&TokenPrices>,
    balances: Option<&TokenBalances>,
) -> Vec<f64> {
    assets
        .iter()
        .map(|asset| token_limit_usd(asset, prices, balances))
        .collect()
}
