//! Configuration management for Lambda functions.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

/// Upper bound for `EVENTS_RECENCY_DAYS`, keeping the floor timestamp representable.
pub const MAX_RECENCY_DAYS: i64 = 3650;

/// How falla metadata is attached to each returned event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallaEmbedding {
    /// `nameFalla` / `urlImageFalla` at the top level of the event
    #[default]
    Flattened,
    /// A `falla` object (or null) nested inside the event
    Nested,
}

impl FromStr for FallaEmbedding {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flattened" | "flat" => Ok(Self::Flattened),
            "nested" => Ok(Self::Nested),
            other => Err(Error::Config(format!("Unknown FALLA_EMBEDDING value: {}", other))),
        }
    }
}

/// Where the API key comes from.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    /// Key given directly in the environment
    Plain(String),
    /// ARN of a Secrets Manager secret holding the key
    Secret(String),
}

/// Identifiers of the databases and collections the feed reads from.
#[derive(Debug, Clone)]
pub struct Collections {
    /// Database holding events and saved events
    pub events_database: String,
    /// Database holding fallas
    pub users_database: String,
    pub events: String,
    pub user_events: String,
    pub fallas: String,
}

/// Knobs for the event list query.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Retries after the first failed attempt of a remote call
    pub max_retries: u32,
    /// Fixed pause between attempts
    pub retry_delay: Duration,
    /// Whether `page` turns into limit/offset predicates
    pub pagination: bool,
    pub page_size: u32,
    /// Cap applied to unpaginated lists and to the saved-events lookup
    pub list_limit: u32,
    /// Events starting before `now - recency_days` are never returned
    pub recency_days: i64,
    pub embedding: FallaEmbedding,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            pagination: true,
            page_size: 25,
            list_limit: 150,
            recency_days: 2,
            embedding: FallaEmbedding::Flattened,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store endpoint, e.g. `https://cloud.appwrite.io/v1`
    pub endpoint: String,
    /// Project the function belongs to
    pub project_id: String,
    pub api_key: ApiKeySource,
    pub collections: Collections,
    pub feed: FeedSettings,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{} not set", key)))
        };

        let api_key = match (lookup("API_KEY_INTERNAL"), lookup("API_KEY_SECRET_ARN")) {
            (Some(key), _) if !key.is_empty() => ApiKeySource::Plain(key),
            (_, Some(arn)) if !arn.is_empty() => ApiKeySource::Secret(arn),
            _ => {
                return Err(Error::Config(
                    "API_KEY_INTERNAL or API_KEY_SECRET_ARN must be set".to_string(),
                ))
            }
        };

        let defaults = FeedSettings::default();
        let feed = FeedSettings {
            max_retries: parse_or(&lookup, "FETCH_MAX_RETRIES", defaults.max_retries)?,
            retry_delay: Duration::from_millis(parse_or(
                &lookup,
                "FETCH_RETRY_DELAY_MS",
                defaults.retry_delay.as_millis() as u64,
            )?),
            pagination: parse_or(&lookup, "EVENTS_PAGINATION", defaults.pagination)?,
            page_size: parse_or(&lookup, "EVENTS_PAGE_SIZE", defaults.page_size)?,
            list_limit: parse_or(&lookup, "EVENTS_LIST_LIMIT", defaults.list_limit)?,
            recency_days: parse_or(&lookup, "EVENTS_RECENCY_DAYS", defaults.recency_days)?,
            embedding: parse_or(&lookup, "FALLA_EMBEDDING", defaults.embedding)?,
        };

        if feed.page_size == 0 {
            return Err(Error::Config("EVENTS_PAGE_SIZE must be at least 1".to_string()));
        }
        if !(0..=MAX_RECENCY_DAYS).contains(&feed.recency_days) {
            return Err(Error::Config(format!(
                "EVENTS_RECENCY_DAYS must be between 0 and {}",
                MAX_RECENCY_DAYS
            )));
        }

        Ok(Self {
            endpoint: required("APPWRITE_FUNCTION_API_ENDPOINT")?
                .trim_end_matches('/')
                .to_string(),
            project_id: required("APPWRITE_FUNCTION_PROJECT_ID")?,
            api_key,
            collections: Collections {
                events_database: required("DATABASE_ID_EVENTS")?,
                users_database: required("DATABASE_ID_USERS")?,
                events: required("EVENTS_COLLECTION_ID")?,
                user_events: required("USER_EVENTS_COLLECTION_ID")?,
                fallas: required("FALLAS_COLLECTION_ID")?,
            },
            feed,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {}: {}", key, e))),
        _ => Ok(default),
    }
}
