//! Data models for allocation and batch building

pub mod asset;
pub mod market;
pub mod allocation;
pub mod batch;

// Re-export for convenience
pub use asset::{AssetConfig, AssetKind, NATIVE_SENTINEL};
pub use market::{LimitChange, MarketDiff, MarketSnapshot, RawAmounts, TokenBalances, TokenPrices};
pub use allocation::{AllocationState, PurchaseItem, TokenAllocation};
pub use batch::{BatchCall, SwapExecuteParams, TokenArrays};
