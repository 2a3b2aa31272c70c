//! Feed store: admitted notifications, newest first

use crate::notification::{Notification, NotificationId, NotificationKind, Target};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// An admitted notification together with its parsed target
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub notification: Notification,
    pub kind: NotificationKind,
    pub target: Option<Target>,
    pub admitted_at: DateTime<Utc>,
}

impl FeedItem {
    pub fn new(notification: Notification, kind: NotificationKind, target: Option<Target>) -> Self {
        Self {
            notification,
            kind,
            target,
            admitted_at: Utc::now(),
        }
    }

    pub fn id(&self) -> NotificationId {
        self.notification.id
    }
}

/// Ordered notifications, newest first, unique by id.
///
/// Mutation is crate-private; outside callers go through the feed.
#[derive(Debug, Default)]
pub struct FeedStore {
    items: VecDeque<FeedItem>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn snapshot(&self) -> Vec<FeedItem> {
        self.items.iter().cloned().collect()
    }

    /// Insert at the front. Returns false, leaving the store untouched, if the id is present.
    pub(crate) fn prepend(&mut self, item: FeedItem) -> bool {
        if self.contains(item.id()) {
            return false;
        }
        self.items.push_front(item);
        true
    }

    pub(crate) fn remove_id(&mut self, id: NotificationId) -> Option<FeedItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        self.items.remove(index)
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Option<FeedItem> {
        self.items.remove(index)
    }
}
