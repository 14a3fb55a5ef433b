use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::models::Notification;

pub type NotificationReceiver = broadcast::Receiver<Notification>;

const DEFAULT_HISTORY: usize = 50;

/// Fan-out for user-facing wallet notifications (toasts and alerts).
/// Keeps the most recent ones for clients that poll instead of subscribing.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
    history: Arc<RwLock<VecDeque<Notification>>>,
    history_limit: usize,
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY)
    }

    pub fn with_history_limit(history_limit: usize) -> Self {
        let (sender, _) = broadcast::channel(100);
        Self {
            sender,
            history: Arc::new(RwLock::new(VecDeque::with_capacity(history_limit))),
            history_limit,
        }
    }

    pub async fn notify(&self, notification: Notification) {
        {
            let mut history = self.history.write().await;
            if history.len() == self.history_limit {
                history.pop_front();
            }
            if self.history_limit > 0 {
                history.push_back(notification.clone());
            }
        }

        if let Err(e) = self.sender.send(notification) {
            debug!("No live notification subscribers: {}", e.0.title);
        }
    }

    pub fn subscribe(&self) -> NotificationReceiver {
        self.sender.subscribe()
    }

    /// Oldest first.
    pub async fn history(&self) -> Vec<Notification> {
        self.history.read().await.iter().cloned().collect()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
