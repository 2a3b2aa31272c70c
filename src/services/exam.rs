//! Student exam participation state

use super::traits::{ExamExerciseLookup, ExamExerciseUpdater};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Exercises of the loaded student exam, their live problem statements and
/// the exercise currently opened by the student
#[derive(Debug, Default)]
pub struct ExamParticipation {
    exercise_ids: RwLock<Option<Vec<i64>>>,
    problem_statements: RwLock<HashMap<i64, String>>,
    current_exercise: RwLock<Option<i64>>,
}

impl ExamParticipation {
    /// No exam loaded yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the exercises of the student exam once it has been loaded
    pub fn load_exam(&self, exercise_ids: Vec<i64>) {
        debug!(exercises = exercise_ids.len(), "Student exam loaded");
        *self
            .exercise_ids
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(exercise_ids);
    }

    /// Latest problem statement pushed for an exercise
    pub fn problem_statement(&self, exercise_id: i64) -> Option<String> {
        self.problem_statements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&exercise_id)
            .cloned()
    }

    pub fn current_exercise(&self) -> Option<i64> {
        *self
            .current_exercise
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ExamExerciseLookup for ExamParticipation {
    fn exam_exercise_ids(&self) -> Option<Vec<i64>> {
        self.exercise_ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ExamExerciseUpdater for ExamParticipation {
    fn update_live_exam_exercise(&self, exercise_id: i64, problem_statement: &str) {
        info!(exercise_id, "Live exam exercise updated");
        self.problem_statements
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(exercise_id, problem_statement.to_string());
    }

    fn navigate_to(&self, exercise_id: i64) {
        info!(exercise_id, "Opening exam exercise");
        *self
            .current_exercise
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(exercise_id);
    }
}
