use async_trait::async_trait;

use crate::errors::FeedError;
use crate::models::market::{MarketDiff, MarketSnapshot};

/// Handler for feed refresh events
#[async_trait]
pub trait FeedEventHandler: Send + Sync {
    /// Called after every refresh whose ceilings moved
    async fn handle_market_change(&self, snapshot: &MarketSnapshot, diff: MarketDiff);

    /// Called when a price or balance query failed
    async fn handle_error(&self, error: &FeedError);
}
