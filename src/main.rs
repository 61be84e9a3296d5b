use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use slider_checkout::utils::helper::{format_address, format_usd, hex_prefix, parse_address, progress_percent};
use slider_checkout::{
    AllocationEngine, AllocationState, AppConfig, AssetDataService, CompositeFeedHandler,
    ConsoleFeedHandler, DataFeedsProvider, FeedStatusHandler, FeedTracker, NotificationQueue,
    PurchaseCalculator, StaticDataProvider, TracingTelemetry, TransactionBatchBuilder,
};

/// Seed the in-memory feed used when no RPC endpoint is configured
fn demo_provider(config: &AppConfig) -> StaticDataProvider {
    let provider = StaticDataProvider::new();
    let demo: [(&str, u128, u128); 3] = [
        ("ETH", 2_000_00000000, 50_000_000_000_000_000),
        ("WBTC", 60_000_00000000, 100_000),
        ("LINK", 15_00000000, 4_000_000_000_000_000_000),
    ];
    for (symbol, price, balance) in demo {
        provider.set_price(symbol, U256::from(price));
        provider.set_balance(config.wallet_address, symbol, U256::from(balance));
    }
    provider
}

fn data_service(config: &AppConfig) -> anyhow::Result<Arc<dyn AssetDataService>> {
    match &config.rpc_url {
        Some(rpc_url) => {
            let contract = config
                .data_feeds_address
                .context("DATA_FEEDS_ADDRESS is required with RPC_URL")?;
            info!("RPC URL: {}", rpc_url);
            info!("DataFeeds contract: {}", contract);
            Ok(Arc::new(DataFeedsProvider::new(rpc_url.clone(), contract)))
        }
        None => {
            warn!("RPC_URL not set, using demo prices and balances");
            Ok(Arc::new(demo_provider(config)))
        }
    }
}

/// Interactive session state
struct Session {
    config: AppConfig,
    engine: AllocationEngine,
    tracker: FeedTracker,
    feed_status: Arc<FeedStatusHandler>,
    calculator: PurchaseCalculator,
    state: AllocationState,
    limits: Vec<f64>,
}

impl Session {
    fn new(config: AppConfig, tracker: FeedTracker, feed_status: Arc<FeedStatusHandler>) -> Self {
        let engine = AllocationEngine::new(config.engine_config())
            .with_telemetry(Arc::new(TracingTelemetry));
        let assets = tracker.assets().to_vec();
        let state = engine.initial_state(assets.len());
        let calculator = PurchaseCalculator::new(assets.clone(), config.payment_token_decimals);

        Self {
            limits: vec![0.0; assets.len()],
            config,
            engine,
            tracker,
            feed_status,
            calculator,
            state,
        }
    }

    /// Pick up ceilings published by the tracker since the last command
    async fn sync_limits(&mut self) {
        let limits = self.tracker.token_limits().await;
        if limits != self.limits {
            self.state = self.engine.refresh(&self.state, &limits);
            self.limits = limits;
        }
    }

    fn asset_index(&self, symbol: &str) -> anyhow::Result<usize> {
        self.tracker
            .assets()
            .iter()
            .position(|a| a.symbol.eq_ignore_ascii_case(symbol))
            .with_context(|| format!("Unknown asset: {}", symbol))
    }

    /// Returns `false` when the session should end
    async fn handle_command(&mut self, line: &str) -> anyhow::Result<bool> {
        self.sync_limits().await;

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["set", symbol, value] => {
                let index = self.asset_index(symbol)?;
                let value: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid slider value: {}", value))?;
                if let Some(reason) = self.engine.rejection(&self.state, index, value) {
                    warn!("Move of {} to {} refused: {:?}", symbol, value, reason);
                    return Ok(true);
                }
                self.state = self.engine.update(&self.state, &self.limits, index, value);
                self.show();
            }
            ["show"] => self.show(),
            ["reset"] => {
                self.state = self.engine.reset(self.limits.len());
                self.show();
            }
            ["buy", target, call_data] => self.buy(target, call_data).await?,
            ["quit"] | ["exit"] => return Ok(false),
            _ => {
                warn!("Commands: set <SYMBOL> <0-100> | show | reset | buy <target> <calldata-hex> | quit");
            }
        }

        Ok(true)
    }

    fn show(&self) {
        let target = self.engine.target_usd();
        info!("{}", "=".repeat(80));
        if !self.feed_status.is_available() {
            let reason = self.feed_status.last_error().unwrap_or_default();
            warn!(
                "Feeds unavailable ({}), retrying every {}ms",
                reason, self.config.tick_interval_ms
            );
        }
        for (i, asset) in self.tracker.assets().iter().enumerate() {
            info!(
                "{:>6}  slider {:>3}%  effective {:>7.3}%  {} of {}",
                asset.symbol,
                self.state.slider_values[i],
                self.state.effective_values[i],
                format_usd(self.state.contribution_usd(i, &self.limits)),
                format_usd(self.limits.get(i).copied().unwrap_or(0.0)),
            );
        }
        info!("{}", "-".repeat(80));
        info!(
            "➤ Allocated: {} / {} ({:.1}%){}",
            format_usd(self.state.total_allocated_usd),
            format_usd(target),
            progress_percent(self.state.total_allocated_usd, target),
            if self.state.is_complete { "  ✓ complete" } else { "" }
        );
        info!("{}", "=".repeat(80));
    }

    async fn buy(&self, target: &str, call_data: &str) -> anyhow::Result<()> {
        let swap_pay = self
            .config
            .swap_pay
            .context("SWAP_PAY_ADDRESS is not configured")?;
        let target: Address = parse_address(target)?;
        let call_data: Bytes = call_data
            .parse()
            .with_context(|| format!("Invalid call data: {}", call_data))?;

        let balances = self
            .tracker
            .current_snapshot()
            .await
            .and_then(|snapshot| snapshot.balances);
        let items = self
            .calculator
            .purchase_items(&self.state, balances.as_ref(), &self.limits)?;
        let payment = self.calculator.payment_amount(self.engine.target_usd());

        let builder = TransactionBatchBuilder::new(swap_pay.address)
            .with_telemetry(Arc::new(TracingTelemetry));
        let calls = builder.build_swap_batch_transaction(&items, target, call_data, payment)?;

        info!(
            "Batch for {} on chain {}:",
            format_address(&self.tracker.account()),
            swap_pay.chain_id
        );
        for (i, call) in calls.iter().enumerate() {
            info!(
                "  {}. to {}  selector {}  {} bytes",
                i + 1,
                call.to,
                hex_prefix(&call.data, 4),
                call.data.len()
            );
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_level(true)
        .with_target(false)
        .with_max_level(config.log_level)
        .with_file(true)
        .with_line_number(true)
        .init();

    tokio::runtime::Runtime::new()?.block_on(async {
        info!("Initializing slider checkout v{}...", slider_checkout::VERSION);
        info!("Network: {:?} (chain {})", config.network.network, config.network.chain_id);
        info!("Wallet Address: {}", config.wallet_address);
        info!("Target: {}", format_usd(config.target_usd));

        let feed_status = Arc::new(FeedStatusHandler::new());
        let mut handlers = CompositeFeedHandler::new();
        handlers.add_handler(Arc::new(ConsoleFeedHandler::new()));
        handlers.add_handler(feed_status.clone());
        let queue = NotificationQueue::new(Arc::new(handlers));
        let tracker = FeedTracker::new(
            config.wallet_address,
            config.network.assets.clone(),
            data_service(&config)?,
            Arc::new(queue.clone()),
        );

        // First snapshot before accepting commands
        tracker.refresh().await;

        let tracker_for_task = tracker.clone();
        let tick_interval = config.tick_interval_ms;
        tokio::spawn(async move {
            if let Err(e) = tracker_for_task.start_tracking_polling(tick_interval).await {
                error!("Tracking error: {}", e);
            }
        });

        let mut session = Session::new(config, tracker, feed_status);
        session.sync_limits().await;
        session.show();

        info!("Slider checkout is running. Type a command or press Ctrl+C to stop.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match session.handle_command(line.trim()).await {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => error!("{:#}", e),
                    }
                }
            }
        }

        queue.shutdown();
        info!("Shutting down...");

        Ok(())
    })
}
