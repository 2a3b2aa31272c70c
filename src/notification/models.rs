//! Notification wire model and kind classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Title carried by group notifications announcing a started quiz
pub const QUIZ_EXERCISE_STARTED_TITLE: &str =
    "artemisApp.groupNotification.title.quizExerciseStarted";

/// Title carried by notifications updating an exercise during a running exam
pub const LIVE_EXAM_EXERCISE_UPDATE_TITLE: &str = "Live Exam Exercise Update";

/// Stable notification identifier assigned by the backend
pub type NotificationId = i64;

/// A notification as delivered by the push channel.
///
/// `target` and `placeholder_values` are kept in their serialized form; they
/// are interpreted by [`crate::notification::Target`] and
/// [`Notification::parsed_placeholder_values`] respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    /// Literal title or translation key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Literal body or translation key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Whether `title` / `text` are translation keys
    #[serde(default)]
    pub text_is_placeholder: bool,
    /// Serialized JSON array of strings substituted into the translated text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_values: Option<String>,
    /// Serialized JSON object describing where the notification leads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_date: Option<DateTime<Utc>>,
}

impl Notification {
    /// Create an empty notification with the given id
    pub fn new(id: NotificationId) -> Self {
        Self {
            id,
            title: None,
            text: None,
            text_is_placeholder: false,
            placeholder_values: None,
            target: None,
            notification_date: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Mark title and text as translation keys, with the given placeholder values
    pub fn with_placeholders<S: AsRef<str>>(mut self, values: &[S]) -> Self {
        let values: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
        self.text_is_placeholder = true;
        self.placeholder_values = serde_json::to_string(&values).ok();
        self
    }

    /// Placeholder values parsed from their serialized form.
    ///
    /// Absent or unparseable values yield an empty list.
    pub fn parsed_placeholder_values(&self) -> Vec<String> {
        self.placeholder_values
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// True when the notification carries a non-empty body text
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Category of a notification, deciding which admission rules apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    QuizStarted,
    LiveExamExerciseUpdate,
    Generic,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuizStarted => write!(f, "quiz-started"),
            Self::LiveExamExerciseUpdate => write!(f, "live-exam-exercise-update"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Titles identifying the special notification kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindTitles {
    pub quiz_started: String,
    pub live_exam_update: String,
}

impl Default for KindTitles {
    fn default() -> Self {
        Self {
            quiz_started: QUIZ_EXERCISE_STARTED_TITLE.to_string(),
            live_exam_update: LIVE_EXAM_EXERCISE_UPDATE_TITLE.to_string(),
        }
    }
}

impl KindTitles {
    /// Classify a notification by exact title match
    pub fn classify(&self, notification: &Notification) -> NotificationKind {
        match notification.title.as_deref() {
            Some(title) if title == self.quiz_started => NotificationKind::QuizStarted,
            Some(title) if title == self.live_exam_update => {
                NotificationKind::LiveExamExerciseUpdate
            }
            _ => NotificationKind::Generic,
        }
    }
}
