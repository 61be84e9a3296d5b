//! Core traits: feed seams, feed event handlers and engine telemetry

pub mod data_provider;
pub mod price_provider;
pub mod event_handler;
pub mod telemetry;

// Re-export for convenience
pub use data_provider::{AssetDataService, BalanceService};
pub use price_provider::PriceService;
pub use event_handler::FeedEventHandler;
pub use telemetry::{AllocationTelemetry, NoopTelemetry, RejectReason, SkipReason};
