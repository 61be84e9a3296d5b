use async_trait::async_trait;
use alloy_primitives::{Address, U256};
use tracing::{debug, info, warn};

use crate::errors::FeedError;
use crate::models::allocation::AllocationState;
use crate::models::batch::BatchCall;
use crate::models::market::{MarketDiff, MarketSnapshot};
use crate::traits::event_handler::FeedEventHandler;
use crate::traits::telemetry::{AllocationTelemetry, RejectReason, SkipReason};
use crate::utils::helper::{format_usd, hex_prefix};

/// Console logging feed handler
pub struct ConsoleFeedHandler;

impl ConsoleFeedHandler {
    /// Create a new console feed handler
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleFeedHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedEventHandler for ConsoleFeedHandler {
    async fn handle_market_change(&self, snapshot: &MarketSnapshot, diff: MarketDiff) {
        if diff.is_empty() {
            return;
        }

        info!("Market changes detected:");
        info!("{}", "-".repeat(80));

        if diff.availability_changed {
            if snapshot.is_available() {
                info!("  Feeds recovered");
            } else {
                info!("  Feeds unavailable, ceilings dropped to zero");
            }
        }

        for change in &diff.changes {
            let change_indicator = if change.change > 0.0 { "↑" } else { "↓" };
            info!("    {} {}", change_indicator, change.symbol);
            info!(
                "       Ceiling: {} → {}",
                format_usd(change.old_limit_usd),
                format_usd(change.new_limit_usd)
            );
            info!("       Change: {:+.2}%", change.percentage_change);
        }

        info!("{}", "=".repeat(80));
    }

    async fn handle_error(&self, error: &FeedError) {
        warn!("Feed error: {}", error);
    }
}

/// Forwards engine telemetry to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl AllocationTelemetry for TracingTelemetry {
    fn update_applied(&self, index: usize, state: &AllocationState) {
        debug!(
            index,
            slider = state.slider_values[index],
            effective = state.effective_values[index],
            total = state.total_allocated_usd,
            complete = state.is_complete,
            "allocation updated"
        );
    }

    fn update_rejected(&self, index: usize, requested: f64, reason: RejectReason) {
        debug!(index, requested, ?reason, "slider move rejected");
    }

    fn state_reset(&self, asset_count: usize) {
        debug!(asset_count, "allocation reset");
    }

    fn item_skipped(&self, symbol: &str, reason: SkipReason) {
        debug!(symbol, ?reason, "purchase item skipped");
    }

    fn token_aggregated(&self, symbol: &str, token: Address, amount: U256, merged: bool) {
        debug!(symbol, %token, %amount, merged, "token aggregated");
    }

    fn batch_built(&self, calls: &[BatchCall]) {
        info!("Built batch with {} calls", calls.len());
        for (i, call) in calls.iter().enumerate() {
            debug!("Call {}: {} ({}...)", i + 1, call.to, hex_prefix(&call.data, 4));
        }
    }
}
