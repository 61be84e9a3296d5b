//! Queue that moves feed events off the polling task
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{error, warn};

use crate::errors::FeedError;
use crate::models::market::{MarketDiff, MarketSnapshot};
use crate::traits::event_handler::FeedEventHandler;

/// Notification types
#[derive(Debug, Clone)]
pub enum Notification {
    MarketChange(Box<MarketSnapshot>, MarketDiff),
    Error(FeedError),
    Shutdown,
}

/// Notification queue for async processing.
///
/// Implements [`FeedEventHandler`] itself, so the tracker can hand events to
/// it without waiting on the wrapped handler.
pub struct NotificationQueue {
    sender: UnboundedSender<Notification>,
}

impl NotificationQueue {
    /// Create a new notification queue; must be called inside a tokio runtime
    pub fn new(handler: Arc<dyn FeedEventHandler>) -> Self {
        let (sender, receiver) = unbounded_channel();

        tokio::spawn(Self::process_notifications(receiver, handler));

        Self { sender }
    }

    async fn process_notifications(
        mut receiver: UnboundedReceiver<Notification>,
        handler: Arc<dyn FeedEventHandler>,
    ) {
        while let Some(notification) = receiver.recv().await {
            match notification {
                Notification::MarketChange(snapshot, diff) => {
                    handler.handle_market_change(&snapshot, diff).await;
                }
                Notification::Error(err) => {
                    handler.handle_error(&err).await;
                }
                Notification::Shutdown => {
                    warn!("Notification processor shutting down");
                    break;
                }
            }
        }
    }

    fn enqueue(&self, notification: Notification) {
        if let Err(e) = self.sender.send(notification) {
            error!("Failed to queue feed notification: {}", e);
        }
    }

    /// Stop the processing task after the queued events
    pub fn shutdown(&self) {
        self.enqueue(Notification::Shutdown);
    }
}

impl Clone for NotificationQueue {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

#[async_trait]
impl FeedEventHandler for NotificationQueue {
    async fn handle_market_change(&self, snapshot: &MarketSnapshot, diff: MarketDiff) {
        self.enqueue(Notification::MarketChange(Box::new(snapshot.clone()), diff));
    }

    async fn handle_error(&self, error: &FeedError) {
        self.enqueue(Notification::Error(error.clone()));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    #[async_trait]
    impl FeedEventHandler for Counter {
        async fn handle_market_change(&self, _: &MarketSnapshot, _: MarketDiff) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        async fn handle_error(&self, _: &FeedError) {
            self.0.fetch_add(10, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn queued_events_reach_the_handler() {
        let counter = Arc::new(Counter::default());
        let queue = NotificationQueue::new(counter.clone());

        let snapshot = MarketSnapshot::new(None, None, vec![]);
        queue.handle_market_change(&snapshot, MarketDiff::default()).await;
        queue.handle_error(&FeedError::prices("down")).await;
        queue.shutdown();

        for _ in 0..50 {
            if counter.0.load(Ordering::SeqCst) == 11 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(counter.0.load(Ordering::SeqCst), 11);
    }
}
