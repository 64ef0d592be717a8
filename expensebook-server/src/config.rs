//! Store configuration
//!
//! Environment variables:
//!   DATABASE_URL                       # Store connection URI (required to connect)
//!   EXPENSEBOOK_CONNECT_TIMEOUT_SECS   # Handshake bound (default: 10)
//!   EXPENSEBOOK_MAX_CONNECTIONS        # Pool size (default: 5)

use std::str::FromStr;
use std::time::Duration;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const CONNECT_TIMEOUT_VAR: &str = "EXPENSEBOOK_CONNECT_TIMEOUT_SECS";
pub const MAX_CONNECTIONS_VAR: &str = "EXPENSEBOOK_MAX_CONNECTIONS";

/// Default handshake bound
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum connections for the pool.
/// Kept low; one process serves one small UI.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection settings for the backing store
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Connection URI; absence is reported on first acquire, not here
    pub database_url: Option<String>,
    pub connect_timeout: Duration,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl StoreConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let database_url = lookup(DATABASE_URL_VAR)
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());

        let connect_timeout = parse_or(
            &lookup,
            CONNECT_TIMEOUT_VAR,
            defaults.connect_timeout.as_secs(),
        );
        let max_connections = parse_or(&lookup, MAX_CONNECTIONS_VAR, defaults.max_connections);

        Self {
            database_url,
            connect_timeout: Duration::from_secs(connect_timeout),
            max_connections: max_connections.max(1),
        }
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(var) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var, value = %raw, %default, "invalid value, using default");
            default
        }),
    }
}
