//! Live notification feed
//!
//! This module provides:
//! - `FeedStore` — displayed notifications, newest first, unique by id
//! - `IngestionFilter` — per-kind admission rules
//! - `RelevanceEvaluator` — "is the user already on that page?"
//! - `ExpiryScheduler` — cancellable per-notification timers
//! - `LiveNotificationFeed` — the component tying them to the auth and push streams

mod error;
mod expiry;
mod ingest;
mod live;
mod relevance;
mod store;
pub mod text;

pub use error::FeedError;
pub use expiry::{ExpiryScheduler, DEFAULT_EXPIRY};
pub use ingest::{Admission, IngestionFilter};
pub use live::{FeedServices, LiveNotificationFeed};
pub use relevance::{quiz_candidates, RelevanceEvaluator};
pub use store::{FeedItem, FeedStore};
pub use text::{resolve_text, resolve_title, NO_TEXT_FOUND, NO_TITLE_FOUND};
