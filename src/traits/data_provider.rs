use alloy_primitives::Address;
use async_trait::async_trait;

use crate::errors::FeedError;
use crate::models::market::TokenBalances;
use crate::traits::price_provider::PriceService;

/// Source of raw wallet balances for the configured assets
#[async_trait]
pub trait BalanceService: Send + Sync {
    /// Fetch every balance of `account` at once; a failure covers the whole set
    async fn get_balances(&self, account: Address) -> Result<TokenBalances, FeedError>;
}

/// A feed that serves both prices and balances
pub trait AssetDataService: PriceService + BalanceService {}

impl<T: PriceService + BalanceService> AssetDataService for T {}
