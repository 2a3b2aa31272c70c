//! Route relevance: is the user already looking at a notification's destination?

use crate::notification::{MatchOptions, QuizTarget, Route, LIVE_QUIZ_STATUS};
use crate::services::Navigator;
use std::sync::Arc;

/// Answers route questions against the navigator's current location,
/// always with [`MatchOptions::EXACT`]
#[derive(Clone)]
pub struct RelevanceEvaluator {
    navigator: Arc<dyn Navigator>,
}

impl RelevanceEvaluator {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    pub fn is_viewing(&self, route: &Route) -> bool {
        self.navigator.is_active(route, &MatchOptions::EXACT)
    }

    /// True when the user is on the quiz target itself or on its live participation page
    pub fn is_viewing_quiz(&self, original: &QuizTarget) -> bool {
        quiz_candidates(original)
            .iter()
            .any(|route| self.is_viewing(route))
    }
}

/// The original target route and the live route (`[mainPage, course, quiz-exercises, id, live]`)
pub fn quiz_candidates(original: &QuizTarget) -> [Route; 2] {
    [
        original.route(),
        original.live().base_route().child(LIVE_QUIZ_STATUS),
    ]
}
