use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::services::recommended_feed::DEFAULT_POOL_WARN_THRESHOLD;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// Pool ceiling override; unset keeps the db-pool sizing for feed-service
    pub max_connections: Option<u32>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expires_in_secs: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expires_in_secs", &self.jwt_expires_in_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma separated origins; `*` allows any origin
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Candidate pool size above which a warning is logged
    pub pool_warn_threshold: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                port: std::env::var("APP_PORT")
                    .unwrap_or_else(|_| "4000".to_string())
                    .parse()
                    .context("APP_PORT must be a valid port number")?,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .map(|v| v.trim().parse::<u32>())
                    .transpose()
                    .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            },
            auth: AuthConfig {
                jwt_secret: std::env::var("JWT_SECRET")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| anyhow!("JWT_SECRET must be set"))?,
                jwt_expires_in_secs: std::env::var("JWT_EXPIRES_IN_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(crypto_core::jwt::DEFAULT_ACCESS_TOKEN_TTL_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| default_cors_origins()),
            },
            feed: FeedConfig {
                pool_warn_threshold: std::env::var("FEED_POOL_WARN_THRESHOLD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_POOL_WARN_THRESHOLD),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}

fn default_cors_origins() -> String {
    "http://localhost:5173".to_string()
}
