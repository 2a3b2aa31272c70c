//! Alert reporter that logs and records errors

use super::traits::AlertReporter;
use std::sync::{Mutex, PoisonError};
use tracing::error;

/// Records every reported error message, newest last
#[derive(Debug, Default)]
pub struct AlertLog {
    messages: Mutex<Vec<String>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AlertReporter for AlertLog {
    fn error(&self, err: &(dyn std::error::Error + Send + Sync)) {
        error!(error = %err, "Alert");
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err.to_string());
    }
}
