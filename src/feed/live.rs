//! Live notification feed
//!
//! ## Design
//!
//! - A supervising task follows the authentication-state stream. While a
//!   user is logged in exactly one push subscription task runs; it is
//!   restarted when the user changes and cancelled on logout.
//! - The push task handles notifications one at a time, so admissions never
//!   interleave.
//! - All state sits behind one `tokio::sync::Mutex`. Outside callers only see
//!   snapshots and the operations below.
//! - Every task and expiry timer hangs off one root `CancellationToken`. The
//!   feed handle owns its drop guard, so dropping the handle (or calling
//!   [`LiveNotificationFeed::shutdown`]) stops everything.

use super::error::FeedError;
use super::expiry::ExpiryScheduler;
use super::ingest::{Admission, IngestionFilter, Verdict};
use super::relevance::RelevanceEvaluator;
use super::store::{FeedItem, FeedStore};
use super::text;
use crate::notification::{Notification, NotificationId, Target};
use crate::services::{
    AlertReporter, AuthStateSource, ExamExerciseLookup, ExamExerciseUpdater, Navigator,
    PushSource, Translator, User,
};
use crate::FeedConfig;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info};

/// Collaborators the feed depends on
#[derive(Clone)]
pub struct FeedServices {
    pub auth: Arc<dyn AuthStateSource>,
    pub push: Arc<dyn PushSource>,
    pub translator: Arc<dyn Translator>,
    pub exam_lookup: Arc<dyn ExamExerciseLookup>,
    pub exam_updater: Arc<dyn ExamExerciseUpdater>,
    pub alerts: Arc<dyn AlertReporter>,
    pub navigator: Arc<dyn Navigator>,
}

struct FeedState {
    store: FeedStore,
    expiry: ExpiryScheduler,
    /// Exercise ids of the student exam, cached once known for this session
    exam_exercise_ids: Option<Vec<i64>>,
    user: Option<User>,
}

struct FeedInner {
    services: FeedServices,
    filter: IngestionFilter,
    state: Mutex<FeedState>,
    root: CancellationToken,
    started: AtomicBool,
}

/// Live notification feed: push ingestion, route-aware filtering and timed expiry
pub struct LiveNotificationFeed {
    inner: Arc<FeedInner>,
    _guard: DropGuard,
}

impl LiveNotificationFeed {
    pub fn new(services: FeedServices, config: &FeedConfig) -> Self {
        let root = CancellationToken::new();
        let filter = IngestionFilter::new(
            config.titles.clone(),
            RelevanceEvaluator::new(services.navigator.clone()),
            services.exam_lookup.clone(),
            services.exam_updater.clone(),
            services.alerts.clone(),
        );
        let state = FeedState {
            store: FeedStore::new(),
            expiry: ExpiryScheduler::new(config.expiry, root.child_token()),
            exam_exercise_ids: None,
            user: None,
        };

        Self {
            inner: Arc::new(FeedInner {
                services,
                filter,
                state: Mutex::new(state),
                root: root.clone(),
                started: AtomicBool::new(false),
            }),
            _guard: root.drop_guard(),
        }
    }

    /// Start following the authentication state. Subsequent calls do nothing.
    pub fn initialize(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return;
        }
        tokio::spawn(supervise(self.inner.clone()));
        info!("Live notification feed initialized");
    }

    /// Run one notification through the admission pipeline.
    ///
    /// Once the feed is shut down nothing is admitted any more.
    pub async fn on_push_notification(&self, notification: Notification) -> Admission {
        self.inner.ingest(notification).await
    }

    /// Remove the notification at `index` (0 = newest) and cancel its expiry
    pub async fn dismiss(&self, index: usize) -> Result<Notification, FeedError> {
        let mut state = self.inner.state.lock().await;
        let len = state.store.len();
        let item = state
            .store
            .remove_at(index)
            .ok_or(FeedError::IndexOutOfRange { index, len })?;
        state.expiry.cancel(item.id());
        debug!(id = item.id(), index, "Notification dismissed");
        Ok(item.notification)
    }

    /// Follow a notification the user clicked.
    ///
    /// Exam updates open the exercise inside the exam; everything else
    /// navigates to the target route. Without target, nothing happens.
    pub fn navigate_to_target(&self, notification: &Notification) -> Result<(), FeedError> {
        let Some(raw) = notification.target.as_deref() else {
            debug!(id = notification.id, "No target, staying on current location");
            return Ok(());
        };
        let kind = self.inner.filter.classify(notification);
        match Target::parse(kind, notification.id, raw)? {
            Target::ExamExerciseUpdate(target) => {
                self.inner.services.exam_updater.navigate_to(target.exercise)
            }
            target => self.inner.services.navigator.navigate(&target.route()),
        }
        Ok(())
    }

    /// Newest-first snapshot of the displayed notifications
    pub async fn notifications(&self) -> Vec<FeedItem> {
        self.inner.state.lock().await.store.snapshot()
    }

    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of expiry timers still pending
    pub async fn pending_expiries(&self) -> usize {
        self.inner.state.lock().await.expiry.pending()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.inner.state.lock().await.user.clone()
    }

    pub fn resolve_title(&self, notification: &Notification) -> String {
        text::resolve_title(notification, self.inner.services.translator.as_ref())
    }

    pub fn resolve_text(&self, notification: &Notification) -> String {
        text::resolve_text(notification, self.inner.services.translator.as_ref())
    }

    /// Cancel the subscriptions and every pending expiry
    pub async fn shutdown(&self) {
        self.inner.root.cancel();
        self.inner.state.lock().await.expiry.cancel_all();
        info!("Live notification feed shut down");
    }
}

impl FeedInner {
    async fn ingest(self: &Arc<Self>, notification: Notification) -> Admission {
        let id = notification.id;
        let mut state = self.state.lock().await;

        // Checked under the lock: shutdown cancels the root before clearing timers
        if self.root.is_cancelled() {
            debug!(id, "Feed shut down, notification discarded");
            return Admission::Closed;
        }
        if state.store.contains(id) {
            debug!(id, "Duplicate notification");
            return Admission::Duplicate;
        }

        let state = &mut *state;
        match self.filter.evaluate(notification, &mut state.exam_exercise_ids) {
            Verdict::Admit(item) => {
                let kind = item.kind;
                state.store.prepend(item);
                let weak = Arc::downgrade(self);
                state
                    .expiry
                    .schedule(id, move |generation| expire(weak, id, generation));
                info!(id, kind = %kind, "Notification admitted");
                Admission::Admitted
            }
            Verdict::Reject(admission) => {
                debug!(id, outcome = %admission, "Notification not admitted");
                admission
            }
        }
    }

    /// Reset per-session state when a different user logs in
    async fn begin_session(&self, user: User) {
        let mut state = self.state.lock().await;
        state.user = Some(user);
        state.exam_exercise_ids = None;
    }

    async fn end_session(&self) {
        let mut state = self.state.lock().await;
        state.user = None;
        state.exam_exercise_ids = None;
    }
}

async fn expire(feed: Weak<FeedInner>, id: NotificationId, generation: u64) {
    let Some(feed) = feed.upgrade() else {
        return;
    };
    let mut state = feed.state.lock().await;
    if state.expiry.complete(id, generation) && state.store.remove_id(id).is_some() {
        debug!(id, "Notification expired");
    }
}

/// Follow the authentication state and keep one push subscription per login
async fn supervise(inner: Arc<FeedInner>) {
    let mut auth = inner.services.auth.authentication_state();
    let mut session: Option<(User, CancellationToken)> = None;

    loop {
        tokio::select! {
            biased;
            _ = inner.root.cancelled() => break,
            next = auth.next() => match next {
                Some(Some(user)) => {
                    if session.as_ref().is_some_and(|(current, _)| *current == user) {
                        continue;
                    }
                    if let Some((_, token)) = session.take() {
                        token.cancel();
                    }
                    info!(login = %user.login, "Subscribing to notification updates");
                    inner.begin_session(user.clone()).await;
                    let token = inner.root.child_token();
                    tokio::spawn(consume(inner.clone(), token.clone()));
                    session = Some((user, token));
                }
                Some(None) => {
                    if let Some((user, token)) = session.take() {
                        info!(login = %user.login, "Unsubscribing from notification updates");
                        token.cancel();
                        inner.end_session().await;
                    }
                }
                None => {
                    debug!("Authentication state stream ended");
                    break;
                }
            },
        }
    }

    if let Some((_, token)) = session {
        token.cancel();
    }
}

/// Drain one push subscription until cancelled or the stream ends
async fn consume(inner: Arc<FeedInner>, token: CancellationToken) {
    let mut notifications = inner.services.push.subscribe();
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = notifications.next() => match next {
                Some(notification) => {
                    inner.ingest(notification).await;
                }
                None => {
                    debug!("Push notification stream ended");
                    break;
                }
            },
        }
    }
}
