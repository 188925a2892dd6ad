use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_MODEL;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_model: String,
    pub port: u16,
    pub rust_log: String,
    pub data_dir: PathBuf,
    /// When set, JSON logs are also written to `<log_dir>/combined.log`.
    pub log_dir: Option<PathBuf>,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u32,
    pub cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            port: parse_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")),
            log_dir: std::env::var("LOG_DIR").ok().map(PathBuf::from),
            rate_limit_window: window_secs(
                "RATE_LIMIT_WINDOW_SECS",
                parse_env("RATE_LIMIT_WINDOW_SECS", 15 * 60)?,
            )?,
            rate_limit_max: parse_env("RATE_LIMIT_MAX", 100)?,
            cache_ttl: Duration::from_secs(parse_env("CACHE_TTL_SECS", 60 * 60)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// A window of zero seconds would never close.
fn window_secs(key: &str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
