//! Ingestion filter: decides what happens to each pushed notification
//!
//! ## Rules
//!
//! - **quiz-started**: suppressed while the user is on the quiz page or its
//!   live participation page; otherwise admitted with its target rewritten to
//!   the live participation.
//! - **live-exam-exercise-update**: only for exercises of the loaded student
//!   exam. The new problem statement is always forwarded; the notification is
//!   shown only if it has text and the user is on the exam page.
//! - anything else is ignored.

use super::relevance::RelevanceEvaluator;
use super::store::FeedItem;
use crate::notification::{
    ExamUpdateTarget, KindTitles, Notification, NotificationKind, QuizTarget, Target,
    TargetError,
};
use crate::services::{AlertReporter, ExamExerciseLookup, ExamExerciseUpdater};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of pushing one notification into the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Prepended to the feed, expiry scheduled
    Admitted,
    /// A notification with the same id is already displayed
    Duplicate,
    /// The user is already viewing the notification's destination
    AlreadyViewing,
    /// Exam exercises are not loaded yet
    Deferred,
    /// The updated exercise is not part of the student's exam
    NotInExam,
    /// Exam update applied, but nothing to display on the current page
    NotShown,
    /// The target could not be parsed; reported as an alert
    Malformed,
    /// Kind without special handling, or no target
    Ignored,
    /// The feed has been shut down
    Closed,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

impl fmt::Display for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Admitted => "admitted",
            Self::Duplicate => "duplicate",
            Self::AlreadyViewing => "already_viewing",
            Self::Deferred => "deferred",
            Self::NotInExam => "not_in_exam",
            Self::NotShown => "not_shown",
            Self::Malformed => "malformed",
            Self::Ignored => "ignored",
            Self::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

pub(crate) enum Verdict {
    Admit(FeedItem),
    Reject(Admission),
}

pub struct IngestionFilter {
    titles: KindTitles,
    relevance: RelevanceEvaluator,
    exam_lookup: Arc<dyn ExamExerciseLookup>,
    exam_updater: Arc<dyn ExamExerciseUpdater>,
    alerts: Arc<dyn AlertReporter>,
}

impl IngestionFilter {
    pub fn new(
        titles: KindTitles,
        relevance: RelevanceEvaluator,
        exam_lookup: Arc<dyn ExamExerciseLookup>,
        exam_updater: Arc<dyn ExamExerciseUpdater>,
        alerts: Arc<dyn AlertReporter>,
    ) -> Self {
        Self {
            titles,
            relevance,
            exam_lookup,
            exam_updater,
            alerts,
        }
    }

    pub fn classify(&self, notification: &Notification) -> NotificationKind {
        self.titles.classify(notification)
    }

    /// Decide on one notification. `exam_ids` is the per-session cache of the
    /// student exam's exercise ids, filled on first need.
    pub(crate) fn evaluate(
        &self,
        notification: Notification,
        exam_ids: &mut Option<Vec<i64>>,
    ) -> Verdict {
        match self.classify(&notification) {
            NotificationKind::QuizStarted => self.evaluate_quiz(notification),
            NotificationKind::LiveExamExerciseUpdate => {
                self.evaluate_exam_update(notification, exam_ids)
            }
            NotificationKind::Generic => Verdict::Reject(Admission::Ignored),
        }
    }

    fn evaluate_quiz(&self, mut notification: Notification) -> Verdict {
        let Some(raw) = notification.target.as_deref() else {
            return Verdict::Reject(Admission::Ignored);
        };
        let original = match QuizTarget::from_json(notification.id, raw) {
            Ok(target) => target,
            Err(e) => return self.reject_malformed(e),
        };

        if self.relevance.is_viewing_quiz(&original) {
            debug!(id = notification.id, route = %original.route(), "User already on quiz page");
            return Verdict::Reject(Admission::AlreadyViewing);
        }

        let target = Target::QuizStarted(original.live());
        notification.target = match target.to_json() {
            Ok(json) => Some(json),
            Err(e) => return self.reject_malformed(e),
        };
        Verdict::Admit(FeedItem::new(
            notification,
            NotificationKind::QuizStarted,
            Some(target),
        ))
    }

    fn evaluate_exam_update(
        &self,
        notification: Notification,
        exam_ids: &mut Option<Vec<i64>>,
    ) -> Verdict {
        let Some(raw) = notification.target.as_deref() else {
            return Verdict::Reject(Admission::Ignored);
        };

        if exam_ids.is_none() {
            *exam_ids = self.exam_lookup.exam_exercise_ids();
        }
        let Some(ids) = exam_ids.as_ref() else {
            debug!(id = notification.id, "Exam exercises not loaded yet");
            return Verdict::Reject(Admission::Deferred);
        };

        let exercise = match ExamUpdateTarget::peek_exercise(notification.id, raw) {
            Ok(exercise) => exercise,
            Err(e) => return self.reject_malformed(e),
        };
        if !ids.contains(&exercise) {
            return Verdict::Reject(Admission::NotInExam);
        }

        let target = match ExamUpdateTarget::from_json(notification.id, raw) {
            Ok(target) => target,
            Err(e) => return self.reject_malformed(e),
        };
        self.exam_updater
            .update_live_exam_exercise(target.exercise, &target.problem_statement);

        if !notification.has_text() || !self.relevance.is_viewing(&target.route()) {
            return Verdict::Reject(Admission::NotShown);
        }

        Verdict::Admit(FeedItem::new(
            notification,
            NotificationKind::LiveExamExerciseUpdate,
            Some(Target::ExamExerciseUpdate(target)),
        ))
    }

    fn reject_malformed(&self, error: TargetError) -> Verdict {
        warn!(error = %error, "Dropping notification with unusable target");
        self.alerts.error(&error);
        Verdict::Reject(Admission::Malformed)
    }
}
