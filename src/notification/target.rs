//! Per-kind navigation targets
//!
//! Targets arrive as serialized JSON objects. Each notification kind has its
//! own shape; parsing happens once, when the notification is ingested.

use super::models::{NotificationId, NotificationKind};
use super::route::Route;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Entity segment of a live quiz target
pub const LIVE_QUIZ_ENTITY: &str = "quiz-exercises";

/// Status segment of a live quiz target
pub const LIVE_QUIZ_STATUS: &str = "live";

/// Errors raised while interpreting a notification target
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("malformed {kind} target on notification {id}: {source}")]
    Malformed {
        id: NotificationId,
        kind: NotificationKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot serialize {kind} target: {source}")]
    Serialize {
        kind: NotificationKind,
        #[source]
        source: serde_json::Error,
    },
}

/// A route path segment; the backend sends ids as numbers and names as strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Number(i64),
    Text(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for PathSegment {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Target of a quiz-started notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizTarget {
    pub main_page: PathSegment,
    pub course: PathSegment,
    pub entity: PathSegment,
    pub id: PathSegment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Fields this crate does not interpret, kept for re-serialization
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuizTarget {
    pub fn from_json(id: NotificationId, raw: &str) -> Result<Self, TargetError> {
        decode(NotificationKind::QuizStarted, id, raw)
    }

    /// The same target pointed at the live participation of the quiz
    pub fn live(&self) -> Self {
        Self {
            entity: PathSegment::from(LIVE_QUIZ_ENTITY),
            status: Some(LIVE_QUIZ_STATUS.to_string()),
            ..self.clone()
        }
    }

    /// `[mainPage, course, entity, id]`, without status
    pub fn base_route(&self) -> Route {
        Route::from_segments([&self.main_page, &self.course, &self.entity, &self.id])
    }

    /// `[mainPage, course, entity, id, status?]`
    pub fn route(&self) -> Route {
        match &self.status {
            Some(status) => self.base_route().child(status.clone()),
            None => self.base_route(),
        }
    }
}

/// Target of a live exam exercise update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamUpdateTarget {
    pub main_page: PathSegment,
    pub course: PathSegment,
    pub entity: PathSegment,
    pub exam: PathSegment,
    pub exercise: i64,
    #[serde(default)]
    pub problem_statement: String,
}

impl ExamUpdateTarget {
    pub fn from_json(id: NotificationId, raw: &str) -> Result<Self, TargetError> {
        decode(NotificationKind::LiveExamExerciseUpdate, id, raw)
    }

    /// `[mainPage, course, entity, exam]`
    pub fn route(&self) -> Route {
        Route::from_segments([&self.main_page, &self.course, &self.entity, &self.exam])
    }

    /// Read only the exercise id from a raw target, without validating the rest.
    ///
    /// Fails if the target is not a JSON object with an integer `exercise`.
    pub fn peek_exercise(id: NotificationId, raw: &str) -> Result<i64, TargetError> {
        #[derive(Deserialize)]
        struct ExerciseOnly {
            exercise: i64,
        }

        decode::<ExerciseOnly>(NotificationKind::LiveExamExerciseUpdate, id, raw)
            .map(|target| target.exercise)
    }
}

/// Target of any other notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericTarget {
    pub main_page: PathSegment,
    pub course: PathSegment,
    pub entity: PathSegment,
    pub id: PathSegment,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenericTarget {
    pub fn from_json(id: NotificationId, raw: &str) -> Result<Self, TargetError> {
        decode(NotificationKind::Generic, id, raw)
    }

    /// `[mainPage, course, entity, id]`
    pub fn route(&self) -> Route {
        Route::from_segments([&self.main_page, &self.course, &self.entity, &self.id])
    }
}

/// A parsed notification target, one variant per notification kind
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    QuizStarted(QuizTarget),
    ExamExerciseUpdate(ExamUpdateTarget),
    Generic(GenericTarget),
}

impl Target {
    /// Parse a serialized target according to the notification kind
    pub fn parse(
        kind: NotificationKind,
        id: NotificationId,
        raw: &str,
    ) -> Result<Self, TargetError> {
        match kind {
            NotificationKind::QuizStarted => QuizTarget::from_json(id, raw).map(Self::QuizStarted),
            NotificationKind::LiveExamExerciseUpdate => {
                ExamUpdateTarget::from_json(id, raw).map(Self::ExamExerciseUpdate)
            }
            NotificationKind::Generic => GenericTarget::from_json(id, raw).map(Self::Generic),
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::QuizStarted(_) => NotificationKind::QuizStarted,
            Self::ExamExerciseUpdate(_) => NotificationKind::LiveExamExerciseUpdate,
            Self::Generic(_) => NotificationKind::Generic,
        }
    }

    /// Where navigating to this target leads
    pub fn route(&self) -> Route {
        match self {
            Self::QuizStarted(t) => t.route(),
            Self::ExamExerciseUpdate(t) => t.route(),
            Self::Generic(t) => t.route(),
        }
    }

    /// Serialize back to the wire form
    pub fn to_json(&self) -> Result<String, TargetError> {
        let serialized = match self {
            Self::QuizStarted(t) => serde_json::to_string(t),
            Self::ExamExerciseUpdate(t) => serde_json::to_string(t),
            Self::Generic(t) => serde_json::to_string(t),
        };
        serialized.map_err(|source| TargetError::Serialize {
            kind: self.kind(),
            source,
        })
    }
}

fn decode<T: DeserializeOwned>(
    kind: NotificationKind,
    id: NotificationId,
    raw: &str,
) -> Result<T, TargetError> {
    serde_json::from_str(raw).map_err(|source| TargetError::Malformed { id, kind, source })
}
