//! Collaborator traits consumed by the live notification feed
//!
//! Every collaborator is injected as `Arc<dyn Trait>`; the in-process
//! implementations in this module's siblings are what the binary and the tests
//! wire together.

use super::account::User;
use crate::notification::{MatchOptions, Notification, Route};
use futures::stream::BoxStream;

/// Marker embedded in the output of a [`Translator`] when a key is unknown
pub const TRANSLATION_NOT_FOUND: &str = "translation-not-found";

/// Source of the "current user or nobody" sequence.
///
/// Each call returns a fresh stream that starts with the current state.
pub trait AuthStateSource: Send + Sync {
    fn authentication_state(&self) -> BoxStream<'static, Option<User>>;
}

/// Source of pushed notifications. One stream per subscription.
pub trait PushSource: Send + Sync {
    fn subscribe(&self) -> BoxStream<'static, Notification>;
}

/// Translation lookup with placeholder substitution
pub trait Translator: Send + Sync {
    /// Resolve `key`. Unknown keys yield a string containing [`TRANSLATION_NOT_FOUND`].
    fn translate(&self, key: &str, placeholder_values: &[String]) -> String;
}

/// Exercises of the student exam currently loaded in the client
pub trait ExamExerciseLookup: Send + Sync {
    /// `None` while the exam has not been loaded yet
    fn exam_exercise_ids(&self) -> Option<Vec<i64>>;
}

/// Receiver of live exam exercise changes
pub trait ExamExerciseUpdater: Send + Sync {
    fn update_live_exam_exercise(&self, exercise_id: i64, problem_statement: &str);

    /// Open the given exercise inside the running exam
    fn navigate_to(&self, exercise_id: i64);
}

/// User-visible error surfacing; fire-and-forget
pub trait AlertReporter: Send + Sync {
    fn error(&self, error: &(dyn std::error::Error + Send + Sync));
}

/// Router: performs navigation and answers "is this route the current location?"
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);

    fn is_active(&self, route: &Route, options: &MatchOptions) -> bool;
}
