use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub database_max_connections: u32,
    /// Rolling window in which an author may submit one note per question.
    pub note_rate_limit_window: Duration,
    pub stream_channel_capacity: usize,
    pub request_timeout: Duration,
    /// Empty means any origin is allowed.
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            note_rate_limit_window: Duration::from_secs(
                env::var("NOTE_RATE_LIMIT_WINDOW_SECS")
                    .unwrap_or_else(|_| "86400".to_string())
                    .parse()
                    .context("NOTE_RATE_LIMIT_WINDOW_SECS must be a number of seconds")?,
            ),
            stream_channel_capacity: env::var("STREAM_CHANNEL_CAPACITY")
                .unwrap_or_else(|_| "256".to_string())
                .parse()
                .context("STREAM_CHANNEL_CAPACITY must be a valid number")?,
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            ),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
