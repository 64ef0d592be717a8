//! PostgreSQL connection pool
//!
//! Uses sqlx PgPool with explicit connection limits. The pool is the
//! handle the connection manager caches.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::connection::{ConnectionError, Connector};
use super::migrations;
use super::postgres::PgCollections;
use crate::config::StoreConfig;

/// Create a PostgreSQL connection pool with custom options.
///
/// # Arguments
///
/// * `database_url` - PostgreSQL connection string
/// * `max_connections` - Maximum number of connections in the pool
/// * `acquire_timeout` - Bound on opening/acquiring a connection
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}

/// Connector producing a migrated PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgConnector {
    max_connections: u32,
    acquire_timeout: Duration,
}

impl PgConnector {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            acquire_timeout: config.connect_timeout,
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = PgCollections;

    async fn connect(&self, database_url: &str) -> Result<PgCollections, ConnectionError> {
        let pool =
            create_pool_with_options(database_url, self.max_connections, self.acquire_timeout)
                .await
                .map_err(|e| ConnectionError::Handshake(e.to_string()))?;

        migrations::run(&pool)
            .await
            .map_err(|e| ConnectionError::Handshake(format!("migrations failed: {}", e)))?;

        Ok(PgCollections::new(pool))
    }

    fn is_healthy(&self, handle: &PgCollections) -> bool {
        !handle.pool().is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ConnectionManager;

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p expensebook-server -- --ignored

    #[test]
    fn connector_takes_limits_from_config() {
        let config = StoreConfig {
            max_connections: 9,
            connect_timeout: Duration::from_secs(4),
            ..StoreConfig::default()
        };
        let connector = PgConnector::new(&config);
        assert_eq!(connector.max_connections, 9);
        assert_eq!(connector.acquire_timeout, Duration::from_secs(4));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connection_error() {
        let config = StoreConfig::default()
            .with_database_url("postgres://nobody@127.0.0.1:1/none")
            .with_connect_timeout(Duration::from_secs(2));
        let manager = ConnectionManager::new(PgConnector::new(&config), &config);

        let err = manager.acquire().await.unwrap_err();
        assert!(matches!(err, crate::Error::Connection(_)));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let config = StoreConfig::default().with_database_url(url);
        let manager = ConnectionManager::new(PgConnector::new(&config), &config);

        let handle = manager.acquire().await.expect("connect failed");
        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(handle.pool())
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
        assert!(manager.connector().is_healthy(&handle));
    }
}
