//! Live Notification Feed - command line driver
//!
//! Replays recorded notifications through the feed for a given user,
//! location and exam, and prints what the popup would display.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use live_notification_feed::feed::{FeedItem, FeedServices, LiveNotificationFeed};
use live_notification_feed::notification::Notification;
use live_notification_feed::services::{
    AccountState, AlertLog, Catalog, ExamParticipation, InMemoryRouter, NotificationBus, User,
};
use live_notification_feed::Config;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "live-feed")]
#[command(about = "Live notification feed driver")]
struct Cli {
    /// Path to the YAML config file (defaults to ./feed.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push notifications (one JSON object per line) through the feed
    Replay {
        /// Notification file, or "-" for stdin
        #[arg(short, long)]
        file: PathBuf,

        /// Location the user is currently viewing
        #[arg(short, long, default_value = "/")]
        location: String,

        /// Login of the authenticated user
        #[arg(short, long, default_value = "student")]
        user: String,

        /// Exercise ids of the loaded student exam, comma separated
        #[arg(long, value_delimiter = ',')]
        exam_exercises: Option<Vec<i64>>,

        /// Wait for the expiry window, then print the feed again
        #[arg(long)]
        wait_expiry: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr, so stdout stays machine readable)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,live_notification_feed=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Replay {
            file,
            location,
            user,
            exam_exercises,
            wait_expiry,
        } => {
            run_replay(
                config,
                &file,
                &location,
                User::new(user),
                exam_exercises,
                wait_expiry,
            )
            .await
        }
    }
}

async fn run_replay(
    config: Config,
    file: &Path,
    location: &str,
    user: User,
    exam_exercises: Option<Vec<i64>>,
    wait_expiry: bool,
) -> Result<()> {
    let notifications = read_notifications(file)?;
    tracing::info!("Replaying {} notifications at {}", notifications.len(), location);

    let translator = match &config.translations_path {
        Some(path) => Catalog::from_json_file(path)?,
        None => Catalog::new(),
    };
    let exam = Arc::new(ExamParticipation::new());
    if let Some(ids) = exam_exercises {
        exam.load_exam(ids);
    }
    let account = Arc::new(AccountState::new());
    let services = FeedServices {
        auth: account.clone(),
        push: Arc::new(NotificationBus::new(config.feed.bus_capacity)),
        translator: Arc::new(translator),
        exam_lookup: exam.clone(),
        exam_updater: exam.clone(),
        alerts: Arc::new(AlertLog::new()),
        navigator: Arc::new(InMemoryRouter::new(location)),
    };

    let feed = LiveNotificationFeed::new(services, &config.feed);
    feed.initialize();
    account.authenticate(user);

    for notification in notifications {
        let id = notification.id;
        let admission = feed.on_push_notification(notification).await;
        println!(
            "{}",
            serde_json::json!({ "id": id, "admission": admission.to_string() })
        );
    }

    print_feed(&feed, &feed.notifications().await);

    if wait_expiry {
        tokio::time::sleep(config.feed.expiry + std::time::Duration::from_millis(100)).await;
        print_feed(&feed, &feed.notifications().await);
    }

    feed.shutdown().await;
    Ok(())
}

fn read_notifications(file: &Path) -> Result<Vec<Notification>> {
    let reader: Box<dyn BufRead> = if file == Path::new("-") {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let handle = std::fs::File::open(file)
            .with_context(|| format!("Failed to open {}", file.display()))?;
        Box::new(BufReader::new(handle))
    };

    let mut notifications = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let notification = serde_json::from_str(&line)
            .with_context(|| format!("Invalid notification on line {}", index + 1))?;
        notifications.push(notification);
    }
    Ok(notifications)
}

fn print_feed(feed: &LiveNotificationFeed, items: &[FeedItem]) {
    println!("{}", serde_json::json!({ "displayed": items.len() }));
    for item in items {
        println!(
            "{}",
            serde_json::json!({
                "id": item.id(),
                "kind": item.kind,
                "title": feed.resolve_title(&item.notification),
                "text": feed.resolve_text(&item.notification),
                "target": item.notification.target,
                "admittedAt": item.admitted_at.to_rfc3339(),
            })
        );
    }
}
