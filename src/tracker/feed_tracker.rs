use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy_primitives::Address;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::engine::limits::compute_token_limits;
use crate::models::asset::AssetConfig;
use crate::models::market::MarketSnapshot;
use crate::traits::data_provider::AssetDataService;
use crate::traits::event_handler::FeedEventHandler;
use crate::utils::helper::format_usd;

/// Keeps the latest prices, balances and ceilings for one wallet
#[derive(Clone)]
pub struct FeedTracker {
    account: Address,
    assets: Arc<Vec<AssetConfig>>,
    data_service: Arc<dyn AssetDataService>,
    event_handler: Arc<dyn FeedEventHandler>,
    current_snapshot: Arc<Mutex<Option<MarketSnapshot>>>,
}

impl FeedTracker {
    /// Create a new feed tracker
    pub fn new(
        account: Address,
        assets: Vec<AssetConfig>,
        data_service: Arc<dyn AssetDataService>,
        event_handler: Arc<dyn FeedEventHandler>,
    ) -> Self {
        Self {
            account,
            assets: Arc::new(assets),
            data_service,
            event_handler,
            current_snapshot: Arc::new(Mutex::new(None)),
        }
    }

    /// Get wallet address
    pub fn account(&self) -> Address {
        self.account
    }

    pub fn assets(&self) -> &[AssetConfig] {
        &self.assets
    }

    pub fn symbols(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.symbol.clone()).collect()
    }

    /// Latest snapshot, if a refresh has completed
    pub async fn current_snapshot(&self) -> Option<MarketSnapshot> {
        self.current_snapshot.lock().await.clone()
    }

    /// Latest ceilings; all zero before the first refresh
    pub async fn token_limits(&self) -> Vec<f64> {
        match self.current_snapshot.lock().await.as_ref() {
            Some(snapshot) => snapshot.limits.clone(),
            None => vec![0.0; self.assets.len()],
        }
    }

    /// Query both feeds concurrently.
    ///
    /// A failed side is reported to the event handler and left as `None`, which
    /// zeroes every ceiling for this snapshot.
    pub async fn take_snapshot(&self) -> MarketSnapshot {
        let (prices, balances) = tokio::join!(
            self.data_service.get_prices(),
            self.data_service.get_balances(self.account),
        );

        let prices = match prices {
            Ok(prices) => Some(prices),
            Err(e) => {
                self.event_handler.handle_error(&e).await;
                None
            }
        };
        let balances = match balances {
            Ok(balances) => Some(balances),
            Err(e) => {
                self.event_handler.handle_error(&e).await;
                None
            }
        };

        let limits = compute_token_limits(&self.assets, prices.as_ref(), balances.as_ref());
        MarketSnapshot::new(prices, balances, limits)
    }

    /// Take a snapshot, notify on changes and store it
    pub async fn refresh(&self) -> MarketSnapshot {
        let new_snapshot = self.take_snapshot().await;
        let old_snapshot = self.current_snapshot.lock().await.clone();

        match old_snapshot {
            Some(old) => {
                let diff = new_snapshot.diff(&old, &self.symbols());
                if !diff.is_empty() {
                    self.event_handler
                        .handle_market_change(&new_snapshot, diff)
                        .await;
                }
            }
            None => self.log_snapshot(&new_snapshot),
        }

        *self.current_snapshot.lock().await = Some(new_snapshot.clone());
        new_snapshot
    }

    /// Log the ceilings of a snapshot
    pub fn log_snapshot(&self, snapshot: &MarketSnapshot) {
        info!("{}", "=".repeat(80));
        info!("MARKET SNAPSHOT");
        info!("{}", "=".repeat(80));
        info!("Wallet Address: {}", self.account);
        info!(
            "Timestamp: {}",
            snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );

        if !snapshot.is_available() {
            info!("Price or balance data unavailable, ceilings are zero");
        }

        for (i, asset) in self.assets.iter().enumerate() {
            let limit = snapshot.limits.get(i).copied().unwrap_or(0.0);
            info!("{}. {} ({})", i + 1, asset.symbol, asset.name);
            info!("   Ceiling: {}", format_usd(limit));
        }

        info!("{}", "-".repeat(80));
        info!("➤ Total Spendable: {}", format_usd(snapshot.total_limit_usd()));
        info!("{}", "=".repeat(80));
    }

    /// Start polling-based refresh
    pub async fn start_tracking_polling(&self, tick_interval_ms: u64) -> anyhow::Result<()> {
        info!("Starting feed polling with interval: {}ms", tick_interval_ms);

        let mut timedelta = Instant::now();
        self.refresh().await;

        loop {
            let sleep_ms = tick_interval_ms as i128 - timedelta.elapsed().as_millis() as i128;
            if sleep_ms > 0 {
                tokio::time::sleep(Duration::from_millis(sleep_ms as u64)).await;
            }
            timedelta = Instant::now();

            let start_time = Instant::now();
            self.refresh().await;
            debug!("Tick completed in {:?}", start_time.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use alloy_primitives::U256;
    use async_trait::async_trait;

    use super::*;
    use crate::errors::FeedError;
    use crate::models::asset::{AssetKind, NATIVE_SENTINEL};
    use crate::models::market::MarketDiff;
    use crate::providers::static_provider::StaticDataProvider;

    #[derive(Default)]
    struct Recorder {
        changes: StdMutex<Vec<MarketDiff>>,
        errors: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl FeedEventHandler for Recorder {
        async fn handle_market_change(&self, _snapshot: &MarketSnapshot, diff: MarketDiff) {
            self.changes.lock().unwrap().push(diff);
        }

        async fn handle_error(&self, error: &FeedError) {
            self.errors.lock().unwrap().push(error.to_string());
        }
    }

    fn setup() -> (FeedTracker, StaticDataProvider, Arc<Recorder>) {
        let wallet = Address::repeat_byte(0xaa);
        let provider = StaticDataProvider::new();
        provider.set_price("ETH", U256::from(2_000u64 * 100_000_000));
        provider.set_balance(wallet, "ETH", U256::from(1_000_000_000_000_000_000u64));
        let recorder = Arc::new(Recorder::default());
        let tracker = FeedTracker::new(
            wallet,
            vec![AssetConfig::new("ETH", Some(NATIVE_SENTINEL), 8, 18, AssetKind::Native)],
            Arc::new(provider.clone()),
            recorder.clone(),
        );
        (tracker, provider, recorder)
    }

    #[tokio::test]
    async fn limits_are_zero_before_first_refresh() {
        let (tracker, _, _) = setup();
        assert_eq!(tracker.token_limits().await, vec![0.0]);
    }

    #[tokio::test]
    async fn refresh_computes_ceilings_and_reports_changes() {
        let (tracker, provider, recorder) = setup();

        tracker.refresh().await;
        assert!((tracker.token_limits().await[0] - 2000.0).abs() < 1e-9);
        assert!(recorder.changes.lock().unwrap().is_empty());

        provider.set_price("ETH", U256::from(2_500u64 * 100_000_000));
        tracker.refresh().await;
        assert!((tracker.token_limits().await[0] - 2500.0).abs() < 1e-9);
        assert_eq!(recorder.changes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn outage_zeroes_ceilings_and_reports_error() {
        let (tracker, provider, recorder) = setup();
        tracker.refresh().await;

        provider.set_balances_available(false);
        let snapshot = tracker.refresh().await;

        assert!(!snapshot.is_available());
        assert_eq!(tracker.token_limits().await, vec![0.0]);
        assert_eq!(recorder.errors.lock().unwrap().len(), 1);
        assert!(recorder.changes.lock().unwrap()[0].availability_changed);
    }
}
