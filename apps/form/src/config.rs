use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::ambient::AmbientSettings;
use crate::models::BubbleBounds;
use crate::view::ViewSettings;

pub const DEFAULT_SUBMIT_URL: &str = "http://localhost:5000/custom-resume";

/// Longest accepted bubble interval or lifetime. Keeps deadlines well inside
/// the range the timer wheel can hold.
pub const MAX_BUBBLE_TIMER: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Simulated,
    Http,
}

impl FromStr for SubmitMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" => Ok(SubmitMode::Simulated),
            "http" => Ok(SubmitMode::Http),
            other => bail!("SUBMIT_MODE must be 'simulated' or 'http', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub submit_mode: SubmitMode,
    pub submit_url: String,
    pub submit_timeout: Duration,
    pub simulated_delay: Duration,
    pub bubble_interval: Duration,
    pub bubble_lifetime: Duration,
    pub bubble_bounds: BubbleBounds,
    pub bubble_seed: Option<u64>,
    pub clear_on_success: bool,
    pub download_dir: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bubble_bounds = BubbleBounds {
            min_size_px: parse_or(&lookup, "BUBBLE_MIN_SIZE_PX", 10.0)?,
            max_size_px: parse_or(&lookup, "BUBBLE_MAX_SIZE_PX", 60.0)?,
        };
        if !bubble_bounds.min_size_px.is_finite() || !bubble_bounds.max_size_px.is_finite() {
            bail!("BUBBLE_MIN_SIZE_PX and BUBBLE_MAX_SIZE_PX must be finite numbers");
        }
        if bubble_bounds.min_size_px < 0.0 {
            bail!(
                "BUBBLE_MIN_SIZE_PX ({}) must not be negative",
                bubble_bounds.min_size_px
            );
        }
        if bubble_bounds.min_size_px >= bubble_bounds.max_size_px {
            bail!(
                "BUBBLE_MIN_SIZE_PX ({}) must be below BUBBLE_MAX_SIZE_PX ({})",
                bubble_bounds.min_size_px,
                bubble_bounds.max_size_px
            );
        }

        let config = Config {
            submit_mode: parse_or(&lookup, "SUBMIT_MODE", SubmitMode::Simulated)?,
            submit_url: lookup("SUBMIT_URL").unwrap_or_else(|| DEFAULT_SUBMIT_URL.to_string()),
            submit_timeout: Duration::from_secs(parse_or(&lookup, "SUBMIT_TIMEOUT_SECS", 60)?),
            simulated_delay: Duration::from_millis(parse_or(&lookup, "SIMULATED_DELAY_MS", 2000)?),
            bubble_interval: Duration::from_millis(parse_or(&lookup, "BUBBLE_INTERVAL_MS", 2000)?),
            bubble_lifetime: Duration::from_millis(parse_or(&lookup, "BUBBLE_LIFETIME_MS", 8000)?),
            bubble_bounds,
            bubble_seed: lookup("BUBBLE_SEED")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("BUBBLE_SEED must be an unsigned integer")?,
            clear_on_success: parse_or(&lookup, "CLEAR_ON_SUCCESS", false)?,
            download_dir: lookup("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };

        if config.bubble_interval.is_zero() {
            bail!("BUBBLE_INTERVAL_MS must be greater than zero");
        }
        for (key, value) in [
            ("BUBBLE_INTERVAL_MS", config.bubble_interval),
            ("BUBBLE_LIFETIME_MS", config.bubble_lifetime),
        ] {
            if value > MAX_BUBBLE_TIMER {
                bail!(
                    "{key} must be at most {} ms, got {} ms",
                    MAX_BUBBLE_TIMER.as_millis(),
                    value.as_millis()
                );
            }
        }
        if config.submit_timeout.is_zero() {
            bail!("SUBMIT_TIMEOUT_SECS must be greater than zero");
        }
        Ok(config)
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            ambient: AmbientSettings {
                interval: self.bubble_interval,
                lifetime: self.bubble_lifetime,
                bounds: self.bubble_bounds,
                seed: self.bubble_seed,
            },
            submit_timeout: self.submit_timeout,
            clear_on_success: self.clear_on_success,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
    }
}
