use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::FeedError;
use crate::models::market::{MarketDiff, MarketSnapshot};
use crate::traits::event_handler::FeedEventHandler;

/// Remembers whether the feeds currently deliver data, for display
#[derive(Debug)]
pub struct FeedStatusHandler {
    available: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl FeedStatusHandler {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            last_error: Mutex::new(None),
        }
    }

    /// Check if the last refresh had both prices and balances
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Most recent feed failure, cleared once the feeds recover
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }

    fn set_error(&self, error: Option<String>) {
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = error;
        }
    }
}

impl Default for FeedStatusHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedEventHandler for FeedStatusHandler {
    async fn handle_market_change(&self, snapshot: &MarketSnapshot, diff: MarketDiff) {
        if !diff.availability_changed {
            return;
        }
        let available = snapshot.is_available();
        self.available.store(available, Ordering::SeqCst);
        if available {
            self.set_error(None);
        }
    }

    async fn handle_error(&self, error: &FeedError) {
        self.available.store(false, Ordering::SeqCst);
        self.set_error(Some(error.to_string()));
    }
}
