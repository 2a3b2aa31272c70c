//! Collaborators of the live notification feed
//!
//! This module provides:
//! - the collaborator traits the feed depends on (`traits`)
//! - `AccountState` — watch-backed authentication state
//! - `NotificationBus` — broadcast channel for pushed notifications
//! - `InMemoryRouter` — current location and navigation
//! - `Catalog` — translation lookup
//! - `ExamParticipation` — student exam exercises and live updates
//! - `AlertLog` — recorded user-visible errors

mod account;
mod alerts;
mod bus;
mod exam;
mod router;
mod translate;
pub mod traits;

pub use account::{AccountState, User};
pub use alerts::AlertLog;
pub use bus::{NotificationBus, DEFAULT_CAPACITY};
pub use exam::ExamParticipation;
pub use router::InMemoryRouter;
pub use traits::{
    AlertReporter, AuthStateSource, ExamExerciseLookup, ExamExerciseUpdater, Navigator,
    PushSource, Translator, TRANSLATION_NOT_FOUND,
};
pub use translate::Catalog;
