//! Database settings and pool construction.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use stockroom_core::{DomainError, DomainResult};

/// Wait budget for a single repository operation. An in-flight operation
/// that exceeds it is abandoned and reported as `Unavailable`.
pub const DEFAULT_OP_BUDGET: Duration = Duration::from_secs(3);

/// Connection-pool tuning knobs.
#[derive(Debug, Clone)]
pub struct DbSettings {
    pub dsn: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl DbSettings {
    /// Settings with the tuned defaults, for the given DSN.
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            max_connections: 10,
            min_connections: 0,
            max_lifetime: Duration::from_secs(60 * 60),
            idle_timeout: Duration::from_secs(30 * 60),
            acquire_timeout: DEFAULT_OP_BUDGET,
        }
    }

    /// Read the DSN from `DB_DSN`.
    pub fn from_env() -> anyhow::Result<Self> {
        let dsn = std::env::var("DB_DSN").map_err(|_| anyhow::anyhow!("DB_DSN is not set"))?;
        Ok(Self::new(dsn))
    }
}

/// Build a connection pool and verify the database is reachable.
pub async fn connect(settings: &DbSettings) -> DomainResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .max_lifetime(settings.max_lifetime)
        .idle_timeout(settings.idle_timeout)
        .acquire_timeout(settings.acquire_timeout)
        .connect(&settings.dsn)
        .await
        .map_err(|e| DomainError::unavailable(format!("failed to connect: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_pool() {
        let s = DbSettings::new("postgres://localhost/stockroom");
        assert_eq!(s.max_connections, 10);
        assert_eq!(s.min_connections, 0);
        assert_eq!(s.max_lifetime, Duration::from_secs(3600));
        assert_eq!(s.idle_timeout, Duration::from_secs(1800));
        assert_eq!(s.acquire_timeout, DEFAULT_OP_BUDGET);
    }
}
