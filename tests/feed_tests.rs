//! End-to-end tests for the live notification feed
//!
//! All collaborators are the in-process implementations; time is paused so
//! expiry windows elapse instantly and deterministically.

use live_notification_feed::feed::{Admission, FeedError, FeedServices, LiveNotificationFeed};
use live_notification_feed::notification::{
    KindTitles, Notification, NotificationKind, Route, Target, LIVE_EXAM_EXERCISE_UPDATE_TITLE,
    QUIZ_EXERCISE_STARTED_TITLE,
};
use live_notification_feed::services::{
    AccountState, AlertLog, Catalog, ExamParticipation, InMemoryRouter, NotificationBus, User,
};
use live_notification_feed::FeedConfig;
use std::sync::Arc;
use std::time::Duration;

const QUIZ_TARGET: &str = r#"{"mainPage":"courses","course":5,"entity":"quiz-exercises","id":9}"#;
const EXAM_TARGET: &str = r#"{"mainPage":"courses","course":5,"entity":"exams","exam":3,"exercise":11,"problemStatement":"Use a HashMap"}"#;
const EXAM_PAGE: &str = "/courses/5/exams/3";

struct Harness {
    account: Arc<AccountState>,
    bus: Arc<NotificationBus>,
    router: Arc<InMemoryRouter>,
    exam: Arc<ExamParticipation>,
    alerts: Arc<AlertLog>,
    feed: LiveNotificationFeed,
}

fn harness(location: &str) -> Harness {
    harness_with(location, FeedConfig::default())
}

fn harness_with(location: &str, config: FeedConfig) -> Harness {
    let account = Arc::new(AccountState::new());
    let bus = Arc::new(NotificationBus::default());
    let router = Arc::new(InMemoryRouter::new(location));
    let exam = Arc::new(ExamParticipation::new());
    let alerts = Arc::new(AlertLog::new());
    let translator = Catalog::new()
        .with_entry(QUIZ_EXERCISE_STARTED_TITLE, "Quiz started")
        .with_entry("quiz.text", "{{ placeholderValues.0 }} is now live");

    let services = FeedServices {
        auth: account.clone(),
        push: bus.clone(),
        translator: Arc::new(translator),
        exam_lookup: exam.clone(),
        exam_updater: exam.clone(),
        alerts: alerts.clone(),
        navigator: router.clone(),
    };
    let feed = LiveNotificationFeed::new(services, &config);

    Harness {
        account,
        bus,
        router,
        exam,
        alerts,
        feed,
    }
}

fn quiz(id: i64) -> Notification {
    Notification::new(id)
        .with_title(QUIZ_EXERCISE_STARTED_TITLE)
        .with_text("A quiz has started")
        .with_target(QUIZ_TARGET)
}

fn exam_update(id: i64, exercise: i64) -> Notification {
    let target = EXAM_TARGET.replace("\"exercise\":11", &format!("\"exercise\":{}", exercise));
    Notification::new(id)
        .with_title(LIVE_EXAM_EXERCISE_UPDATE_TITLE)
        .with_text("The problem statement was updated")
        .with_target(target)
}

/// Let spawned tasks run until they are idle
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

async fn wait_for_subscribers(bus: &NotificationBus, expected: usize) {
    for _ in 0..100 {
        if bus.subscriber_count() == expected {
            return;
        }
        settle().await;
    }
    panic!(
        "expected {} subscribers, found {}",
        expected,
        bus.subscriber_count()
    );
}

async fn feed_ids(feed: &LiveNotificationFeed) -> Vec<i64> {
    feed.notifications().await.iter().map(|i| i.id()).collect()
}

// ============================================================================
// Admission
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_duplicate_id_admitted_once() {
    let h = harness("/courses/5");

    assert_eq!(h.feed.on_push_notification(quiz(1)).await, Admission::Admitted);
    let second = quiz(1).with_text("a different body");
    assert_eq!(h.feed.on_push_notification(second).await, Admission::Duplicate);

    let items = h.feed.notifications().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].notification.text.as_deref(), Some("A quiz has started"));
    assert_eq!(h.feed.pending_expiries().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_quiz_scenario_suppressed_then_admitted() {
    let config = FeedConfig {
        titles: KindTitles {
            quiz_started: "quiz.started".into(),
            ..KindTitles::default()
        },
        ..FeedConfig::default()
    };
    let h = harness_with("/courses/5/quiz-exercises/9/live", config);
    let notification = Notification::new(1)
        .with_title("quiz.started")
        .with_target(QUIZ_TARGET);

    assert_eq!(
        h.feed.on_push_notification(notification.clone()).await,
        Admission::AlreadyViewing
    );
    assert!(h.feed.is_empty().await);

    h.router.set_location("/courses/5");
    assert_eq!(
        h.feed.on_push_notification(notification).await,
        Admission::Admitted
    );

    let items = h.feed.notifications().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, NotificationKind::QuizStarted);
    let stored: serde_json::Value =
        serde_json::from_str(items[0].notification.target.as_deref().unwrap()).unwrap();
    assert_eq!(stored["entity"], "quiz-exercises");
    assert_eq!(stored["status"], "live");
    assert_eq!(stored["id"], 9);
}

#[tokio::test(start_paused = true)]
async fn test_quiz_suppressed_on_percent_encoded_location() {
    let h = harness("/courses/5/quiz%2Dexercises/9/live");

    assert_eq!(
        h.feed.on_push_notification(quiz(1)).await,
        Admission::AlreadyViewing
    );
    assert!(h.feed.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_quiz_target_entity_and_status_overridden() {
    let h = harness("/courses/5");
    let notification = quiz(1).with_target(
        r#"{"mainPage":"courses","course":5,"entity":"exercises","id":9,"status":"ended"}"#,
    );

    assert!(h.feed.on_push_notification(notification).await.is_admitted());

    let items = h.feed.notifications().await;
    let Some(Target::QuizStarted(target)) = &items[0].target else {
        panic!("expected quiz target");
    };
    assert_eq!(target.entity.to_string(), "quiz-exercises");
    assert_eq!(target.status.as_deref(), Some("live"));
}

#[tokio::test(start_paused = true)]
async fn test_exam_update_outside_exam_never_admitted() {
    let h = harness(EXAM_PAGE);
    h.exam.load_exam(vec![1, 2, 3]);

    assert_eq!(
        h.feed.on_push_notification(exam_update(1, 11)).await,
        Admission::NotInExam
    );
    h.router.set_location("/courses/5");
    assert_eq!(
        h.feed.on_push_notification(exam_update(2, 11).with_text("")).await,
        Admission::NotInExam
    );

    assert!(h.feed.is_empty().await);
    assert!(h.exam.problem_statement(11).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_exam_update_shown_only_on_exam_page() {
    let h = harness("/courses/5/exams/3/overview");
    h.exam.load_exam(vec![11]);

    assert_eq!(
        h.feed.on_push_notification(exam_update(1, 11)).await,
        Admission::NotShown
    );
    assert_eq!(h.exam.problem_statement(11).as_deref(), Some("Use a HashMap"));

    h.router.set_location(EXAM_PAGE);
    assert_eq!(
        h.feed.on_push_notification(exam_update(2, 11)).await,
        Admission::Admitted
    );
    assert_eq!(feed_ids(&h.feed).await, vec![2]);
}

#[tokio::test(start_paused = true)]
async fn test_exam_update_deferred_while_exam_not_loaded() {
    let h = harness(EXAM_PAGE);

    assert_eq!(
        h.feed.on_push_notification(exam_update(1, 11)).await,
        Admission::Deferred
    );
    assert!(h.feed.is_empty().await);

    h.exam.load_exam(vec![11]);
    assert_eq!(
        h.feed.on_push_notification(exam_update(1, 11)).await,
        Admission::Admitted
    );
}

#[tokio::test(start_paused = true)]
async fn test_malformed_exam_target_reported() {
    let h = harness(EXAM_PAGE);
    h.exam.load_exam(vec![11]);
    let notification = exam_update(1, 11).with_target(r#"{"exercise":11,"exam":3}"#);

    assert_eq!(
        h.feed.on_push_notification(notification).await,
        Admission::Malformed
    );
    assert!(h.feed.is_empty().await);
    assert_eq!(h.alerts.messages().len(), 1);
    assert!(h.alerts.messages()[0].contains("malformed"));
}

#[tokio::test(start_paused = true)]
async fn test_unparseable_exam_target_reported() {
    let h = harness(EXAM_PAGE);
    h.exam.load_exam(vec![11]);
    let notification = exam_update(1, 11).with_target(r#"{"exercise":11,"#);

    assert_eq!(
        h.feed.on_push_notification(notification).await,
        Admission::Malformed
    );
    assert!(h.feed.is_empty().await);
    assert_eq!(h.alerts.messages().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_generic_notification_dropped() {
    let h = harness("/");
    let notification = Notification::new(1)
        .with_title("New announcement")
        .with_text("Lecture moved")
        .with_target(r#"{"mainPage":"courses","course":5,"entity":"lectures","id":2}"#);

    assert_eq!(
        h.feed.on_push_notification(notification).await,
        Admission::Ignored
    );
    assert!(h.feed.is_empty().await);
}

// ============================================================================
// Expiry and dismissal
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_expires_after_thirty_seconds() {
    let h = harness("/courses/5");
    h.feed.on_push_notification(quiz(1)).await;

    tokio::time::sleep(Duration::from_millis(29_999)).await;
    assert_eq!(feed_ids(&h.feed).await, vec![1]);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(h.feed.is_empty().await);
    assert_eq!(h.feed.pending_expiries().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_expiry_removes_by_id_after_reordering() {
    let h = harness("/courses/5");
    h.feed.on_push_notification(quiz(1)).await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    h.feed.on_push_notification(quiz(2)).await;
    h.feed.on_push_notification(quiz(3)).await;
    // [3, 2, 1] -> dismiss 2
    h.feed.dismiss(1).await.unwrap();

    tokio::time::sleep(Duration::from_secs(21)).await;
    assert_eq!(feed_ids(&h.feed).await, vec![3]);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(h.feed.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_shifts_later_entries() {
    let h = harness("/courses/5");
    for id in 1..=4 {
        h.feed.on_push_notification(quiz(id)).await;
    }
    assert_eq!(feed_ids(&h.feed).await, vec![4, 3, 2, 1]);

    let removed = h.feed.dismiss(2).await.unwrap();
    assert_eq!(removed.id, 2);
    assert_eq!(feed_ids(&h.feed).await, vec![4, 3, 1]);
    assert_eq!(h.feed.pending_expiries().await, 3);
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_out_of_range_is_error() {
    let h = harness("/courses/5");
    h.feed.on_push_notification(quiz(1)).await;

    let err = h.feed.dismiss(1).await.unwrap_err();
    assert!(matches!(err, FeedError::IndexOutOfRange { index: 1, len: 1 }));
    assert_eq!(h.feed.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_readmission_after_dismiss_gets_full_window() {
    let h = harness("/courses/5");
    h.feed.on_push_notification(quiz(1)).await;
    tokio::time::sleep(Duration::from_secs(20)).await;

    h.feed.dismiss(0).await.unwrap();
    assert_eq!(h.feed.on_push_notification(quiz(1)).await, Admission::Admitted);

    // The first admission's timer would have fired at 30s
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(feed_ids(&h.feed).await, vec![1]);

    tokio::time::sleep(Duration::from_secs(16)).await;
    assert!(h.feed.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_custom_expiry_window() {
    let config = FeedConfig {
        expiry: Duration::from_secs(5),
        ..FeedConfig::default()
    };
    let h = harness_with("/courses/5", config);
    h.feed.on_push_notification(quiz(1)).await;

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(h.feed.is_empty().await);
}

// ============================================================================
// Navigation and display
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_navigate_quiz_to_live_page() {
    let h = harness("/courses/5");
    h.feed.on_push_notification(quiz(1)).await;
    let item = h.feed.notifications().await.remove(0);

    h.feed.navigate_to_target(&item.notification).unwrap();

    assert_eq!(
        h.router.location(),
        Route::parse("/courses/5/quiz-exercises/9/live")
    );
}

#[tokio::test(start_paused = true)]
async fn test_navigate_exam_update_delegates_to_exam() {
    let h = harness(EXAM_PAGE);

    h.feed.navigate_to_target(&exam_update(1, 11)).unwrap();

    assert_eq!(h.exam.current_exercise(), Some(11));
    assert!(h.router.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_navigate_generic_and_untargeted() {
    let h = harness("/courses/5");
    let untargeted = Notification::new(1).with_title("Hello");
    h.feed.navigate_to_target(&untargeted).unwrap();
    assert!(h.router.history().is_empty());

    let generic = Notification::new(2)
        .with_title("New lecture")
        .with_target(r#"{"mainPage":"courses","course":5,"entity":"lectures","id":2}"#);
    h.feed.navigate_to_target(&generic).unwrap();
    assert_eq!(h.router.location().to_string(), "/courses/5/lectures/2");

    let broken = Notification::new(3).with_title("x").with_target("[]");
    assert!(matches!(
        h.feed.navigate_to_target(&broken),
        Err(FeedError::Target(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_title_falls_back_when_translation_missing() {
    let h = harness("/");
    let notification = Notification::new(1)
        .with_title("Quiz Started")
        .with_text("quiz.text")
        .with_placeholders(&["Week 3 quiz"]);

    assert_eq!(h.feed.resolve_title(&notification), "Quiz Started");
    assert_eq!(h.feed.resolve_text(&notification), "Week 3 quiz is now live");

    let translated = quiz(2).with_placeholders::<&str>(&[]);
    assert_eq!(h.feed.resolve_title(&translated), "Quiz started");
}

// ============================================================================
// Subscription lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_push_only_while_logged_in() {
    let h = harness("/courses/5");
    h.feed.initialize();
    settle().await;

    // Nobody logged in: no subscription
    assert_eq!(h.bus.publish(quiz(1)), 0);
    assert!(h.feed.current_user().await.is_none());

    h.account.authenticate(User::new("alice"));
    wait_for_subscribers(&h.bus, 1).await;
    assert_eq!(h.bus.publish(quiz(2)), 1);
    settle().await;
    assert_eq!(feed_ids(&h.feed).await, vec![2]);
    assert_eq!(h.feed.current_user().await, Some(User::new("alice")));

    h.account.logout();
    wait_for_subscribers(&h.bus, 0).await;
    assert_eq!(h.bus.publish(quiz(3)), 0);
    assert!(h.feed.current_user().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_initialize_twice_keeps_one_subscription() {
    let h = harness("/courses/5");
    h.account.authenticate(User::new("alice"));
    h.feed.initialize();
    h.feed.initialize();
    wait_for_subscribers(&h.bus, 1).await;

    // Same user re-announced: subscription kept
    h.account.authenticate(User::new("alice"));
    settle().await;
    assert_eq!(h.bus.subscriber_count(), 1);

    h.bus.publish(quiz(1));
    h.bus.publish(quiz(1));
    settle().await;
    assert_eq!(feed_ids(&h.feed).await, vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_new_login_resets_exam_cache() {
    let h = harness(EXAM_PAGE);
    h.exam.load_exam(vec![11]);
    h.account.authenticate(User::new("alice"));
    h.feed.initialize();
    wait_for_subscribers(&h.bus, 1).await;

    h.bus.publish(exam_update(1, 11));
    settle().await;
    assert_eq!(feed_ids(&h.feed).await, vec![1]);

    // Cached for this session: the reloaded exam is not consulted
    h.exam.load_exam(vec![12]);
    h.bus.publish(exam_update(2, 12));
    settle().await;
    assert_eq!(feed_ids(&h.feed).await, vec![1]);

    h.account.authenticate(User::new("bob"));
    settle().await;
    wait_for_subscribers(&h.bus, 1).await;
    h.bus.publish(exam_update(3, 12));
    settle().await;
    assert_eq!(feed_ids(&h.feed).await, vec![3, 1]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_subscription_and_timers() {
    let h = harness("/courses/5");
    h.account.authenticate(User::new("alice"));
    h.feed.initialize();
    wait_for_subscribers(&h.bus, 1).await;
    h.bus.publish(quiz(1));
    settle().await;

    h.feed.shutdown().await;
    wait_for_subscribers(&h.bus, 0).await;
    assert_eq!(h.feed.pending_expiries().await, 0);

    tokio::time::sleep(Duration::from_secs(60)).await;
    // Timers were cancelled, so nothing was removed after teardown
    assert_eq!(feed_ids(&h.feed).await, vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_admitted_after_shutdown() {
    let h = harness("/courses/5");
    h.feed.shutdown().await;

    assert_eq!(h.feed.on_push_notification(quiz(1)).await, Admission::Closed);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(h.feed.is_empty().await);
    assert_eq!(h.feed.pending_expiries().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_feed_unsubscribes() {
    let h = harness("/courses/5");
    h.account.authenticate(User::new("alice"));
    h.feed.initialize();
    wait_for_subscribers(&h.bus, 1).await;

    let Harness { bus, feed, .. } = h;
    drop(feed);
    wait_for_subscribers(&bus, 0).await;
}
