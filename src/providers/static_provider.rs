use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::errors::FeedError;
use crate::models::market::{TokenBalances, TokenPrices};
use crate::traits::data_provider::BalanceService;
use crate::traits::price_provider::PriceService;

/// In-memory feed with settable prices and balances.
///
/// Backs demo mode and tests; outages can be simulated per side.
#[derive(Clone, Default)]
pub struct StaticDataProvider {
    prices: Arc<DashMap<String, U256>>,
    balances: Arc<DashMap<(Address, String), U256>>,
    prices_down: Arc<AtomicBool>,
    balances_down: Arc<AtomicBool>,
}

impl StaticDataProvider {
    /// Create a new static provider with no data
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_price(&self, symbol: impl Into<String>, raw: U256) {
        self.prices.insert(symbol.into(), raw);
    }

    pub fn set_balance(&self, account: Address, symbol: impl Into<String>, raw: U256) {
        self.balances.insert((account, symbol.into()), raw);
    }

    /// Make `get_prices` fail until switched back
    pub fn set_prices_available(&self, available: bool) {
        self.prices_down.store(!available, Ordering::SeqCst);
    }

    /// Make `get_balances` fail until switched back
    pub fn set_balances_available(&self, available: bool) {
        self.balances_down.store(!available, Ordering::SeqCst);
    }
}

#[async_trait]
impl PriceService for StaticDataProvider {
    async fn get_prices(&self) -> Result<TokenPrices, FeedError> {
        if self.prices_down.load(Ordering::SeqCst) {
            return Err(FeedError::prices("static feed switched off"));
        }

        let prices: TokenPrices = self
            .prices
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        debug!("Serving {} static prices", prices.len());
        Ok(prices)
    }
}

#[async_trait]
impl BalanceService for StaticDataProvider {
    async fn get_balances(&self, account: Address) -> Result<TokenBalances, FeedError> {
        if self.balances_down.load(Ordering::SeqCst) {
            return Err(FeedError::balances("static feed switched off"));
        }

        Ok(self
            .balances
            .iter()
            .filter(|entry| entry.key().0 == account)
            .map(|entry| (entry.key().1.clone(), *entry.value()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn balances_are_scoped_per_account() {
        let provider = StaticDataProvider::new();
        let alice = Address::repeat_byte(0x01);
        let bob = Address::repeat_byte(0x02);
        provider.set_balance(alice, "ETH", U256::from(5u64));
        provider.set_balance(bob, "ETH", U256::from(9u64));

        let balances = provider.get_balances(alice).await.unwrap();

        assert_eq!(balances.len(), 1);
        assert_eq!(balances.get("ETH"), Some(U256::from(5u64)));
    }

    #[tokio::test]
    async fn outage_fails_the_whole_query() {
        let provider = StaticDataProvider::new();
        provider.set_price("ETH", U256::from(1u64));
        provider.set_prices_available(false);

        let err = provider.get_prices().await.unwrap_err();
        assert!(matches!(err, FeedError::DataUnavailable { what: "prices", .. }));

        provider.set_prices_available(true);
        assert_eq!(provider.get_prices().await.unwrap().len(), 1);
    }
}
