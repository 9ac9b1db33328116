//! Server Configuration

use crate::auth::TokenConfig;

/// Session inactivity window (minutes) when not configured
const DEFAULT_SESSION_TIMEOUT_MINUTES: i64 = 10;

/// Server configuration
///
/// All values can be overridden through environment variables:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | HTTP_PORT | 3000 | HTTP service port |
/// | DATABASE_PATH | ./storefront.db | SQLite database file |
/// | SESSION_TIMEOUT_MINUTES | 10 | Session inactivity window |
/// | ACCESS_SECRET_KEY | (dev default) | Access token secret |
/// | REFRESH_SECRET_KEY | (dev default) | Refresh token secret |
/// | ENVIRONMENT | development | development \| production |
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API service port
    pub http_port: u16,
    /// SQLite database file path
    pub database_path: String,
    /// Session inactivity window in minutes
    pub session_timeout_minutes: i64,
    /// Token signing configuration
    pub tokens: TokenConfig,
    /// Running environment: development | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, with defaults for
    /// anything unset
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./storefront.db".into()),
            session_timeout_minutes: std::env::var("SESSION_TIMEOUT_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SESSION_TIMEOUT_MINUTES),
            tokens: TokenConfig::from_env(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Session inactivity window in milliseconds
    pub fn session_timeout_ms(&self) -> i64 {
        self.session_timeout_minutes * 60 * 1000
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
