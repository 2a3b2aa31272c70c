//! Authentication state backed by a `tokio::sync::watch` channel

use super::traits::AuthStateSource;
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

/// The authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            name: None,
        }
    }
}

/// Holds the current user and broadcasts every change to subscribers
#[derive(Debug, Clone)]
pub struct AccountState {
    sender: watch::Sender<Option<User>>,
}

impl AccountState {
    /// Start with nobody logged in
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn authenticate(&self, user: User) {
        debug!(login = %user.login, "User authenticated");
        self.sender.send_replace(Some(user));
    }

    pub fn logout(&self) {
        debug!("User logged out");
        self.sender.send_replace(None);
    }

    pub fn current(&self) -> Option<User> {
        self.sender.borrow().clone()
    }
}

impl Default for AccountState {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStateSource for AccountState {
    fn authentication_state(&self) -> BoxStream<'static, Option<User>> {
        WatchStream::new(self.sender.subscribe()).boxed()
    }
}
