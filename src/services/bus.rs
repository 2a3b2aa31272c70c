//! Notification bus: in-process push channel for live notifications

use super::traits::PushSource;
use crate::notification::Notification;
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// Default broadcast channel capacity
pub const DEFAULT_CAPACITY: usize = 1024;

/// Distributes pushed notifications via `tokio::sync::broadcast`
///
/// Publishing never blocks. Notifications published while nobody is
/// subscribed are dropped.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Create a new bus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Push a notification to every subscriber; returns how many received it
    pub fn publish(&self, notification: Notification) -> usize {
        let id = notification.id;
        match self.sender.send(notification) {
            Ok(n) => {
                debug!(id, subscribers = n, "Notification published");
                n
            }
            Err(_) => {
                debug!(id, "Notification published without subscribers");
                0
            }
        }
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PushSource for NotificationBus {
    fn subscribe(&self) -> BoxStream<'static, Notification> {
        BroadcastStream::new(self.sender.subscribe())
            .filter_map(|received| async move {
                match received {
                    Ok(notification) => Some(notification),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Notification subscriber lagged behind");
                        None
                    }
                }
            })
            .boxed()
    }
}
