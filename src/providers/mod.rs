//! Price and balance feeds

pub mod data_feeds_provider;
pub mod static_provider;

// Re-export for convenience
pub use data_feeds_provider::DataFeedsProvider;
pub use static_provider::StaticDataProvider;
