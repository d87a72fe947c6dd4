//! Database connection pool.
//!
//! A note service serving a handful of users needs a small pool; the
//! defaults stay low and are overridable per deployment through
//! `DATABASE_MAX_CONNECTIONS` and `DATABASE_ACQUIRE_TIMEOUT_SECS`.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use echonote_core::{defaults, Error, Result};

/// Pool sizing, resolved from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: defaults::DATABASE_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(defaults::DATABASE_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    /// Read overrides from the environment; unset or unparsable values fall
    /// back to the defaults.
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var(defaults::ENV_DATABASE_MAX_CONNECTIONS).ok(),
            std::env::var(defaults::ENV_DATABASE_ACQUIRE_TIMEOUT_SECS).ok(),
        )
    }

    fn resolve(max_connections: Option<String>, acquire_timeout_secs: Option<String>) -> Self {
        let base = Self::default();
        Self {
            max_connections: max_connections
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(base.max_connections),
            acquire_timeout: acquire_timeout_secs
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(base.acquire_timeout),
        }
    }
}

/// Create a connection pool with default sizing.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

/// Create a connection pool with explicit sizing.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "create",
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        duration_ms = start.elapsed().as_millis() as u64,
        pool_size = pool.size(),
        "Database connection pool ready"
    );

    Ok(pool)
}
