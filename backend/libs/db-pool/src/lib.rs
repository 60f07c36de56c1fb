//! Database connection pool management
//!
//! Unified PostgreSQL pool creation and configuration for Moodfeed services.

pub mod env_utils;
mod metrics;

use env_utils::parse_env_with_default;
use metrics::update_pool_metrics;
pub use metrics::acquire_with_metrics;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};

/// Upper bound for `DB_MAX_CONNECTIONS` overrides
const MAX_CONNECTIONS_CEILING: u32 = 100;

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    /// Service name for metrics labeling
    pub service_name: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Timeout for the initial verification query
    pub connect_timeout_secs: u64,
    /// Timeout for getting a connection from the pool
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            database_url: String::new(),
            max_connections: 20,
            min_connections: 5,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl DbConfig {
    /// Create a DbConfig sized for a specific service
    ///
    /// The feed service issues three reads per request (latest story, post
    /// average, candidate pool), so it gets a larger share than the
    /// conservative default. `DATABASE_URL` may be filled in later by the caller.
    pub fn for_service(service_name: &str) -> Self {
        let (max, min) = match service_name {
            "feed-service" => (12, 3),
            _ => (4, 1),
        };

        Self {
            service_name: service_name.to_string(),
            database_url: std::env::var("DATABASE_URL").unwrap_or_default(),
            ..Self::with_env_overrides(max, min)
        }
    }

    /// Override the pool ceiling, clamped to `1..=100`; `min_connections` follows it down
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.clamp(1, MAX_CONNECTIONS_CEILING);
        self.min_connections = self.min_connections.min(self.max_connections);
        self
    }

    fn with_env_overrides(max: u32, min: u32) -> Self {
        let defaults = Self::default();
        let max_connections =
            parse_env_with_default("DB_MAX_CONNECTIONS", max).clamp(1, MAX_CONNECTIONS_CEILING);
        let min_connections = parse_env_with_default("DB_MIN_CONNECTIONS", min).min(max_connections);

        Self {
            max_connections,
            min_connections,
            connect_timeout_secs: parse_env_with_default(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
            acquire_timeout_secs: parse_env_with_default(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            ),
            idle_timeout_secs: parse_env_with_default(
                "DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout_secs,
            ),
            max_lifetime_secs: parse_env_with_default(
                "DB_MAX_LIFETIME_SECS",
                defaults.max_lifetime_secs,
            ),
            ..defaults
        }
    }

    pub fn log_config(&self) {
        info!(
            "Database Pool Configuration: service={}, \
             max_connections={}, min_connections={}, \
             connect_timeout={}s, acquire_timeout={}s, idle_timeout={}s, max_lifetime={}s",
            self.service_name,
            self.max_connections,
            self.min_connections,
            self.connect_timeout_secs,
            self.acquire_timeout_secs,
            self.idle_timeout_secs,
            self.max_lifetime_secs
        );
    }
}

/// Create a PostgreSQL connection pool with automatic metrics monitoring
pub async fn create_pool(config: DbConfig) -> Result<PgPool, sqlx::Error> {
    debug!(
        "Creating database pool: service={}, max={}, min={}, acquire_timeout={}s",
        config.service_name,
        config.max_connections,
        config.min_connections,
        config.acquire_timeout_secs,
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(&config.database_url)
        .await?;

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        sqlx::query("SELECT 1").execute(&pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!(
                service = %config.service_name,
                "Database pool created and verified successfully"
            );

            update_pool_metrics(&pool, &config.service_name);

            // Background gauge refresher
            {
                let pool_clone = pool.clone();
                let service = config.service_name.clone();
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(Duration::from_secs(30));
                    loop {
                        interval.tick().await;
                        update_pool_metrics(&pool_clone, &service);
                    }
                });
            }

            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(
                service = %config.service_name,
                error = %e,
                "Database connection verification failed"
            );
            Err(e)
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Database verification timeout",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_pool_env() {
        for key in [
            "DB_MAX_CONNECTIONS",
            "DB_MIN_CONNECTIONS",
            "DB_CONNECT_TIMEOUT_SECS",
            "DB_ACQUIRE_TIMEOUT_SECS",
            "DB_IDLE_TIMEOUT_SECS",
            "DB_MAX_LIFETIME_SECS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.acquire_timeout_secs, 10);
    }

    #[test]
    #[serial_test::serial]
    fn test_for_service_sizes() {
        clear_pool_env();

        let feed = DbConfig::for_service("feed-service");
        assert_eq!(feed.max_connections, 12);
        assert_eq!(feed.min_connections, 3);

        let other = DbConfig::for_service("mail-worker");
        assert_eq!(other.max_connections, 4);
        assert_eq!(other.min_connections, 1);
    }

    #[test]
    #[serial_test::serial]
    fn test_env_override_is_clamped() {
        clear_pool_env();
        std::env::set_var("DB_MAX_CONNECTIONS", "999999");
        std::env::set_var("DB_MIN_CONNECTIONS", "500");

        let config = DbConfig::for_service("feed-service");
        assert_eq!(config.max_connections, MAX_CONNECTIONS_CEILING);
        assert_eq!(config.min_connections, MAX_CONNECTIONS_CEILING);

        std::env::set_var("DB_MAX_CONNECTIONS", "0");
        let config = DbConfig::for_service("feed-service");
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.min_connections, 1);

        clear_pool_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_with_max_connections_can_shrink_and_is_clamped() {
        clear_pool_env();

        let shrunk = DbConfig::for_service("feed-service").with_max_connections(2);
        assert_eq!(shrunk.max_connections, 2);
        assert_eq!(shrunk.min_connections, 2);

        let grown = DbConfig::for_service("feed-service").with_max_connections(40);
        assert_eq!(grown.max_connections, 40);
        assert_eq!(grown.min_connections, 3);

        let capped = DbConfig::for_service("feed-service").with_max_connections(5000);
        assert_eq!(capped.max_connections, MAX_CONNECTIONS_CEILING);

        let floored = DbConfig::for_service("feed-service").with_max_connections(0);
        assert_eq!(floored.max_connections, 1);
        assert_eq!(floored.min_connections, 1);
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = DbConfig {
            database_url: "postgres://user:secret@db/moodfeed".to_string(),
            ..DbConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
