//! Allocation engine, ceilings and purchase derivation

pub mod allocation;
pub mod limits;
pub mod purchase;

pub use allocation::{AllocationEngine, EngineConfig, LockPolicy, DEFAULT_EPSILON, DEFAULT_TOLERANCE_USD};
pub use limits::{balance_in_token_units, compute_token_limits, price_in_usd, token_limit_usd};
pub use purchase::PurchaseCalculator;
