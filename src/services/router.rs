//! In-memory router holding the current location

use super::traits::Navigator;
use crate::notification::{MatchOptions, Route};
use std::sync::{PoisonError, RwLock};
use tracing::info;

/// Router state: the current location and every location navigated to
#[derive(Debug)]
pub struct InMemoryRouter {
    current: RwLock<Route>,
    history: RwLock<Vec<Route>>,
}

impl InMemoryRouter {
    /// Start at the given location (e.g. `/courses/5`)
    pub fn new(location: &str) -> Self {
        Self {
            current: RwLock::new(Route::parse(location)),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Replace the current location without recording a navigation
    pub fn set_location(&self, location: &str) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Route::parse(location);
    }

    pub fn location(&self) -> Route {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Routes passed to [`Navigator::navigate`], oldest first
    pub fn history(&self) -> Vec<Route> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for InMemoryRouter {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for InMemoryRouter {
    fn navigate(&self, route: &Route) {
        info!(route = %route, "Navigating");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = route.clone();
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.clone());
    }

    fn is_active(&self, route: &Route, options: &MatchOptions) -> bool {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        route.is_active_in(&current, options)
    }
}
