//! Notification domain types
//!
//! This module provides:
//! - `Notification` — the wire form delivered by the push channel
//! - `NotificationKind` / `KindTitles` — classification by title
//! - `Target` — tagged, per-kind navigation targets parsed once at ingestion
//! - `Route` / `MatchOptions` — URL trees and router-style activity matching

mod models;
mod route;
mod target;

pub use models::{
    KindTitles, Notification, NotificationId, NotificationKind, LIVE_EXAM_EXERCISE_UPDATE_TITLE,
    QUIZ_EXERCISE_STARTED_TITLE,
};
pub use route::{MatchOptions, PathMatch, QueryMatch, Route, Strictness, UrlSegment};
pub use target::{
    ExamUpdateTarget, GenericTarget, PathSegment, QuizTarget, Target, TargetError,
    LIVE_QUIZ_ENTITY, LIVE_QUIZ_STATUS,
};
