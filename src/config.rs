use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::Duration;

use crate::followup::{RetryPolicy, SchedulerSettings};
use crate::matching::score::MatchWeights;
use crate::transcode::TranscodeSettings;

/// Central configuration loaded from environment variables.
///
/// Every value has a default; the .env file is loaded automatically at
/// startup via dotenvy. A value that is set but doesn't parse is an error
/// rather than silently falling back.
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog and media origin (SAVANT_BASE_URL)
    pub savant_base_url: String,
    /// Processed-set database file (PLAYCLIP_DB_PATH)
    pub db_path: String,
    /// ffmpeg binary, looked up on PATH unless absolute (FFMPEG_PATH)
    pub ffmpeg_path: String,
    /// Scratch directories and artifacts live under here (PLAYCLIP_WORK_DIR)
    pub work_dir: PathBuf,
    pub retry: RetryPolicy,
    pub scheduler: SchedulerSettings,
    pub weights: MatchWeights,
    pub transcode: TranscodeSettings,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            grace_period: env_secs("PLAYCLIP_GRACE_SECS", defaults.grace_period)?,
            backoff_base: env_secs("PLAYCLIP_BACKOFF_BASE_SECS", defaults.backoff_base)?,
            backoff_cap: env_secs("PLAYCLIP_BACKOFF_CAP_SECS", defaults.backoff_cap)?,
            max_attempts: env_parse("PLAYCLIP_MAX_ATTEMPTS", defaults.max_attempts)?,
            max_age: env_secs("PLAYCLIP_MAX_AGE_SECS", defaults.max_age)?,
            retry_oversize: env_parse("PLAYCLIP_RETRY_OVERSIZE", defaults.retry_oversize)?,
        };

        let defaults = SchedulerSettings::default();
        let scheduler = SchedulerSettings {
            cycle_interval: StdDuration::from_secs(env_parse(
                "PLAYCLIP_CYCLE_SECS",
                defaults.cycle_interval.as_secs(),
            )?),
            max_duration_secs: env_parse("PLAYCLIP_GIF_MAX_SECS", defaults.max_duration_secs)?,
            max_bytes: env_parse("PLAYCLIP_GIF_MAX_BYTES", defaults.max_bytes)?,
            processed_retention: Duration::days(env_parse(
                "PLAYCLIP_PROCESSED_RETENTION_DAYS",
                defaults.processed_retention.num_days(),
            )?),
        };

        let work_dir = env::var("PLAYCLIP_WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_work_dir());

        Ok(Self {
            savant_base_url: env::var("SAVANT_BASE_URL")
                .unwrap_or_else(|_| crate::savant::client::DEFAULT_SAVANT_URL.to_string()),
            db_path: env::var("PLAYCLIP_DB_PATH").unwrap_or_else(|_| "./playclip.db".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            work_dir,
            retry,
            scheduler,
            weights: MatchWeights::default(),
            transcode: TranscodeSettings::default(),
        })
    }
}

/// Platform cache directory, or the current directory if there isn't one.
pub fn default_work_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("playclip")
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn env_secs(name: &str, default: Duration) -> Result<Duration> {
    env_parse(name, default.num_seconds()).map(Duration::seconds)
}
