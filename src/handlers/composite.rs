use std::sync::Arc;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::errors::FeedError;
use crate::models::allocation::AllocationState;
use crate::models::batch::BatchCall;
use crate::models::market::{MarketDiff, MarketSnapshot};
use crate::traits::event_handler::FeedEventHandler;
use crate::traits::telemetry::{AllocationTelemetry, RejectReason, SkipReason};

/// Composite feed handler that can combine multiple handlers
#[derive(Default)]
pub struct CompositeFeedHandler {
    handlers: Vec<Arc<dyn FeedEventHandler>>,
}

impl CompositeFeedHandler {
    /// Create a new composite feed handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler to the composite
    pub fn add_handler(&mut self, handler: Arc<dyn FeedEventHandler>) {
        self.handlers.push(handler);
    }

    /// Check if there are any handlers
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Number of handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

#[async_trait]
impl FeedEventHandler for CompositeFeedHandler {
    async fn handle_market_change(&self, snapshot: &MarketSnapshot, diff: MarketDiff) {
        for handler in &self.handlers {
            handler.handle_market_change(snapshot, diff.clone()).await;
        }
    }

    async fn handle_error(&self, error: &FeedError) {
        for handler in &self.handlers {
            handler.handle_error(error).await;
        }
    }
}

/// Fans telemetry out to several sinks
#[derive(Default, Clone)]
pub struct CompositeTelemetry {
    sinks: Vec<Arc<dyn AllocationTelemetry>>,
}

impl CompositeTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Arc<dyn AllocationTelemetry>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl AllocationTelemetry for CompositeTelemetry {
    fn update_applied(&self, index: usize, state: &AllocationState) {
        self.sinks.iter().for_each(|s| s.update_applied(index, state));
    }

    fn update_rejected(&self, index: usize, requested: f64, reason: RejectReason) {
        self.sinks.iter().for_each(|s| s.update_rejected(index, requested, reason));
    }

    fn state_reset(&self, asset_count: usize) {
        self.sinks.iter().for_each(|s| s.state_reset(asset_count));
    }

    fn item_skipped(&self, symbol: &str, reason: SkipReason) {
        self.sinks.iter().for_each(|s| s.item_skipped(symbol, reason));
    }

    fn token_aggregated(&self, symbol: &str, token: Address, amount: U256, merged: bool) {
        self.sinks
            .iter()
            .for_each(|s| s.token_aggregated(symbol, token, amount, merged));
    }

    fn batch_built(&self, calls: &[BatchCall]) {
        self.sinks.iter().for_each(|s| s.batch_built(calls));
    }
}
