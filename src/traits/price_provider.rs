use async_trait::async_trait;

use crate::errors::FeedError;
use crate::models::market::TokenPrices;

/// Source of raw USD prices for the configured assets
#[async_trait]
pub trait PriceService: Send + Sync {
    /// Fetch every price at once; a failure covers the whole set
    async fn get_prices(&self) -> Result<TokenPrices, FeedError>;
}
