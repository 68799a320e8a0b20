use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono_tz::Tz;

use crate::collecting::aggregator::FailurePolicy;
use crate::collecting::constants::BASE_URL;
use crate::collecting::retry::RetryPolicy;

/// Everything the pipeline is parameterized on, loaded once in `main` from
/// the environment (with `.env` support) and passed down explicitly. Every
/// field has a default, so a plain `cargo run` works without any setup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub dataset_path: PathBuf,
    pub catalog_path: PathBuf,
    pub output_dir: PathBuf,
    pub timezone: Tz,
    pub slot_minutes: i64,
    pub window_weeks: i64,
    pub retry: RetryPolicy,
    pub failure_policy: FailurePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_url: BASE_URL.to_string(),
            dataset_path: PathBuf::from("appointments.json"),
            catalog_path: PathBuf::from("constants.json"),
            output_dir: PathBuf::from("ics"),
            timezone: chrono_tz::Europe::Berlin,
            slot_minutes: 15,
            window_weeks: 26,
            retry: RetryPolicy::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<AppConfig> {
        let mut config = AppConfig::default();

        if let Ok(value) = env::var("BACKEND_BASE_URL") {
            config.base_url = value;
        }
        if let Ok(value) = env::var("DATASET_PATH") {
            config.dataset_path = PathBuf::from(value);
        }
        if let Ok(value) = env::var("CATALOG_PATH") {
            config.catalog_path = PathBuf::from(value);
        }
        if let Ok(value) = env::var("OUTPUT_DIR") {
            config.output_dir = PathBuf::from(value);
        }
        if let Ok(value) = env::var("CALENDAR_TIMEZONE") {
            config.timezone = value
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid CALENDAR_TIMEZONE '{value}': {e}"))?;
        }
        if let Ok(value) = env::var("SLOT_MINUTES") {
            config.slot_minutes = value.parse().context("parsing SLOT_MINUTES")?;
        }
        if let Ok(value) = env::var("WINDOW_WEEKS") {
            config.window_weeks = value.parse().context("parsing WINDOW_WEEKS")?;
        }
        if let Ok(value) = env::var("RETRY_MAX_ATTEMPTS") {
            config.retry.max_attempts = value.parse().context("parsing RETRY_MAX_ATTEMPTS")?;
        }
        if let Ok(value) = env::var("RETRY_DELAY_SECS") {
            config.retry.delay =
                Duration::from_secs(value.parse().context("parsing RETRY_DELAY_SECS")?);
        }
        if let Ok(value) = env::var("ON_COLLECT_FAILURE") {
            config.failure_policy = value.parse()?;
        }

        Ok(config)
    }
}
