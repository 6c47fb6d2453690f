use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::scrape::client::{DEFAULT_ACTOR_ID, DEFAULT_BASE_URL};
use crate::scrape::ScrapeConfig;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub scrape: ScrapeConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            scrape: ScrapeConfig {
                // Optional: a missing token only fails scrape requests.
                api_token: std::env::var("APIFY_API_TOKEN").ok(),
                base_url: env_or("APIFY_BASE_URL", DEFAULT_BASE_URL),
                actor_id: env_or("APIFY_ACTOR_ID", DEFAULT_ACTOR_ID),
                poll_interval: parse_secs("SCRAPE_POLL_INTERVAL_SECS", 5)?,
                timeout: parse_secs("SCRAPE_TIMEOUT_SECS", 300)?,
            },
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
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

/// A whole number of seconds; zero is rejected.
fn parse_secs(key: &str, default: u64) -> Result<Duration> {
    let secs: u64 = parse_env(key, default)?;
    if secs == 0 {
        bail!("{key} must be at least 1 second");
    }
    Ok(Duration::from_secs(secs))
}
