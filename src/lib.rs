//! Live Notification Feed
//!
//! The notification popup engine of an e-learning / exam client:
//! - consumes pushed notifications while a user is logged in
//! - deduplicates them and filters them by current route and exam context
//! - expires every displayed notification after a fixed window

pub mod feed;
pub mod notification;
pub mod services;

use anyhow::Result;
use notification::{KindTitles, LIVE_EXAM_EXERCISE_UPDATE_TITLE, QUIZ_EXERCISE_STARTED_TITLE};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file, looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "feed.yaml";

/// Contents of the feed's YAML config file
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub feed: FeedYamlConfig,
    pub translations: TranslationsYamlConfig,
}

/// Feed configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedYamlConfig {
    pub expiry_secs: u64,
    pub quiz_started_title: String,
    pub live_exam_update_title: String,
    pub bus_capacity: usize,
}

impl Default for FeedYamlConfig {
    fn default() -> Self {
        Self {
            expiry_secs: 30,
            quiz_started_title: QUIZ_EXERCISE_STARTED_TITLE.into(),
            live_exam_update_title: LIVE_EXAM_EXERCISE_UPDATE_TITLE.into(),
            bus_capacity: services::DEFAULT_CAPACITY,
        }
    }
}

/// Translations section — no path means every lookup falls back to stored text
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TranslationsYamlConfig {
    pub path: Option<String>,
}

/// Settings of one live notification feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// How long an admitted notification stays displayed
    pub expiry: Duration,
    pub titles: KindTitles,
    pub bus_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig::from(FeedYamlConfig::default())
    }
}

impl From<FeedYamlConfig> for FeedConfig {
    fn from(yaml: FeedYamlConfig) -> Self {
        Self {
            expiry: Duration::from_secs(yaml.expiry_secs),
            titles: KindTitles {
                quiz_started: yaml.quiz_started_title,
                live_exam_update: yaml.live_exam_update_title,
            },
            bus_capacity: yaml.bus_capacity,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    pub translations_path: Option<PathBuf>,
}

impl Config {
    /// `FEED_*` environment variables over `./feed.yaml` over defaults
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Resolve the config from `yaml_path` (or `./feed.yaml`) and the `FEED_*`
    /// environment variables, which take precedence. A missing or unreadable
    /// file counts as empty.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);
        let feed = yaml.feed;

        let feed = FeedYamlConfig {
            expiry_secs: env_parsed("FEED_EXPIRY_SECS").unwrap_or(feed.expiry_secs),
            quiz_started_title: std::env::var("FEED_QUIZ_STARTED_TITLE")
                .unwrap_or(feed.quiz_started_title),
            live_exam_update_title: std::env::var("FEED_LIVE_EXAM_UPDATE_TITLE")
                .unwrap_or(feed.live_exam_update_title),
            bus_capacity: env_parsed("FEED_BUS_CAPACITY").unwrap_or(feed.bus_capacity),
        };

        Ok(Self {
            feed: feed.into(),
            translations_path: std::env::var("FEED_TRANSLATIONS_PATH")
                .ok()
                .or(yaml.translations.path)
                .map(PathBuf::from),
        })
    }

    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let path = yaml_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Feed config file not read");
                return YamlConfig::default();
            }
        };

        match serde_yaml::from_str(&contents) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Feed config loaded");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid feed config");
                YamlConfig::default()
            }
        }
    }
}

fn env_parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.parse().ok())
}
