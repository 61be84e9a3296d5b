//! Periodic price/balance refresh

pub mod feed_tracker;

pub use feed_tracker::FeedTracker;
