//! Expiry scheduler: one cancellable timer per admitted notification
//!
//! Each entry is a spawned task racing `tokio::time::sleep` against a child
//! `CancellationToken`. Entries carry a generation number so that a timer
//! which already fired cannot remove a newer admission of the same id.

use crate::notification::NotificationId;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default lifetime of a displayed notification
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct ExpiryEntry {
    generation: u64,
    token: CancellationToken,
}

#[derive(Debug)]
pub struct ExpiryScheduler {
    window: Duration,
    root: CancellationToken,
    entries: HashMap<NotificationId, ExpiryEntry>,
    next_generation: u64,
}

impl ExpiryScheduler {
    /// Timers are children of `root`; cancelling it cancels every pending entry.
    pub fn new(window: Duration, root: CancellationToken) -> Self {
        Self {
            window,
            root,
            entries: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Number of timers that have neither fired nor been cancelled
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_scheduled(&self, id: NotificationId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Start the timer for `id`, replacing any previous one.
    ///
    /// After the window elapses `fire` is called with the entry's generation;
    /// it should call [`ExpiryScheduler::complete`] before removing anything.
    pub fn schedule<F, Fut>(&mut self, id: NotificationId, fire: F)
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel(id);
        self.next_generation += 1;
        let generation = self.next_generation;
        let token = self.root.child_token();
        self.entries.insert(
            id,
            ExpiryEntry {
                generation,
                token: token.clone(),
            },
        );

        let window = self.window;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(window) => fire(generation).await,
            }
        });
    }

    /// Mark the timer of `id` as fired. False if it was cancelled or superseded.
    pub fn complete(&mut self, id: NotificationId, generation: u64) -> bool {
        match self.entries.get(&id) {
            Some(entry) if entry.generation == generation => {
                self.entries.remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Cancel the timer of `id`, if any
    pub fn cancel(&mut self, id: NotificationId) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, entry) in self.entries.drain() {
            entry.token.cancel();
        }
    }
}

impl Drop for ExpiryScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
