//! Slider Checkout Library
//!
//! Splits a fixed USD payment across the assets a wallet holds using one
//! slider per asset, then turns the finished split into an atomic batch of
//! ERC-20 approvals followed by a single swap/pay `execute` call.

// Public modules - these are the API surface
pub mod builder;
pub mod config;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod notifications;
pub mod providers;
pub mod tracker;
pub mod traits;
pub mod utils;

// Re-export commonly used items for easier access
pub use builder::{SwapPayContract, TransactionBatchBuilder};
pub use config::{AppConfig, Network, NetworkConfig};
pub use engine::{AllocationEngine, EngineConfig, LockPolicy, PurchaseCalculator};
pub use errors::{BatchError, EncodeError, FeedError};
pub use handlers::{
    CompositeFeedHandler, CompositeTelemetry, ConsoleFeedHandler, FeedStatusHandler,
    TracingTelemetry,
};
pub use models::{
    AllocationState, AssetConfig, AssetKind, BatchCall, MarketDiff, MarketSnapshot, PurchaseItem,
    SwapExecuteParams, TokenArrays, TokenBalances, TokenPrices, NATIVE_SENTINEL,
};
pub use notifications::NotificationQueue;
pub use providers::{DataFeedsProvider, StaticDataProvider};
pub use tracker::FeedTracker;
pub use traits::{
    AllocationTelemetry, AssetDataService, BalanceService, FeedEventHandler, PriceService,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for library functions
pub type Result<T> = std::result::Result<T, anyhow::Error>;
