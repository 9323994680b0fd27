use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    /// Base URL of the external moderation agent. `None` disables the
    /// moderation pipeline entirely (scheduling becomes a no-op).
    pub agent_base_url: Option<String>,
    /// Timeout for a single agent classification call.
    pub agent_timeout: Duration,
    /// TTL for per-target moderation locks in the lock store.
    pub lock_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let agent_timeout_secs: u64 = env::var("AGENT_HTTP_TIMEOUT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("AGENT_HTTP_TIMEOUT must be a number of seconds")?;

        let lock_ttl_secs: u64 = env::var("MODERATION_LOCK_TTL")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("MODERATION_LOCK_TTL must be a number of seconds")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            agent_base_url: normalize_agent_base_url(env::var("AGENT_BASE_URL").ok()),
            agent_timeout: Duration::from_secs(agent_timeout_secs),
            lock_ttl: Duration::from_secs(lock_ttl_secs),
        })
    }
}

/// Normalize AGENT_BASE_URL, treating unset or blank as "moderation
/// disabled". A trailing slash is stripped so URL joins stay predictable.
fn normalize_agent_base_url(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_agent_url_disables_moderation() {
        assert_eq!(normalize_agent_base_url(None), None);
        assert_eq!(normalize_agent_base_url(Some("   ".to_string())), None);
    }

    #[test]
    fn agent_url_trailing_slash_is_stripped() {
        assert_eq!(
            normalize_agent_base_url(Some("http://agent:9000/".to_string())),
            Some("http://agent:9000".to_string())
        );
    }
}
