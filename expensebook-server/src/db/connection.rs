//! Connection lifecycle management
//!
//! One logical handle to the backing store per process. The first
//! `acquire()` starts a handshake; callers that arrive while it is in flight
//! await that same attempt instead of opening their own, and all of them see
//! the same handle or the same failure.
//!
//! - A failed attempt is cleared once delivered, so the next `acquire()`
//!   tries again. Nothing retries on its own.
//! - A cached handle the connector reports unhealthy is replaced.
//! - Handshakes are bounded by the configured timeout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use super::collections::Collections;
use crate::config::{StoreConfig, DATABASE_URL_VAR};
use crate::error::{Error, Result};

/// Handshake failure, shared verbatim with every waiting caller
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectionError {
    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),
}

/// Opens connections to a backing store.
///
/// Implementations:
/// - `PgConnector` - PostgreSQL pool
/// - `MemoryConnector` - in-process store
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Handle shared by every caller once connected
    type Handle: Collections + Clone + Send + Sync + 'static;

    /// Perform the handshake.
    async fn connect(
        &self,
        database_url: &str,
    ) -> std::result::Result<Self::Handle, ConnectionError>;

    /// Whether a handle returned earlier can still be used.
    fn is_healthy(&self, handle: &Self::Handle) -> bool;
}

type Attempt<H> = Shared<BoxFuture<'static, std::result::Result<H, ConnectionError>>>;

/// The current handshake, pending or resolved
struct Slot<H> {
    generation: usize,
    attempt: Attempt<H>,
}

/// Process-lifetime owner of the store handle.
///
/// Construct once at startup and share it (usually behind an `Arc`) with
/// everything that needs the store.
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    database_url: Option<String>,
    connect_timeout: Duration,
    slot: Mutex<Option<Slot<C::Handle>>>,
    handshakes: AtomicUsize,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, config: &StoreConfig) -> Self {
        Self {
            connector: Arc::new(connector),
            database_url: config.database_url.clone(),
            connect_timeout: config.connect_timeout,
            slot: Mutex::new(None),
            handshakes: AtomicUsize::new(0),
        }
    }

    /// Return the live handle, connecting first if there is none.
    ///
    /// # Errors
    ///
    /// - `Error::Configuration` when no URL is configured (no network call)
    /// - `Error::Connection` when the handshake fails or times out
    pub async fn acquire(&self) -> Result<C::Handle> {
        let Some(url) = self.database_url.as_deref() else {
            return Err(Error::Configuration {
                variable: DATABASE_URL_VAR,
            });
        };

        let (generation, attempt) = {
            let mut slot = self.slot.lock().await;
            let reuse = slot
                .as_ref()
                .filter(|current| self.reusable(current))
                .map(|current| (current.generation, current.attempt.clone()));

            match reuse {
                Some(pair) => pair,
                None => {
                    let fresh = self.start_attempt(url);
                    let pair = (fresh.generation, fresh.attempt.clone());
                    *slot = Some(fresh);
                    pair
                }
            }
        };

        match attempt.await {
            Ok(handle) => Ok(handle),
            Err(err) => {
                let mut slot = self.slot.lock().await;
                if slot.as_ref().is_some_and(|s| s.generation == generation) {
                    *slot = None;
                }
                Err(Error::Connection(err))
            }
        }
    }

    /// Number of handshakes started so far.
    pub fn handshakes(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    pub fn is_configured(&self) -> bool {
        self.database_url.is_some()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    fn reusable(&self, slot: &Slot<C::Handle>) -> bool {
        match slot.attempt.peek() {
            // In flight: join it
            None => true,
            Some(Ok(handle)) => {
                let healthy = self.connector.is_healthy(handle);
                if !healthy {
                    tracing::warn!(
                        attempt = slot.generation,
                        "store handle unhealthy, reconnecting"
                    );
                }
                healthy
            }
            Some(Err(_)) => false,
        }
    }

    fn start_attempt(&self, url: &str) -> Slot<C::Handle> {
        let generation = self.handshakes.fetch_add(1, Ordering::SeqCst) + 1;
        let connector = Arc::clone(&self.connector);
        let url = url.to_owned();
        let timeout = self.connect_timeout;

        let attempt = async move {
            tracing::info!(attempt = generation, "connecting to store");
            match tokio::time::timeout(timeout, connector.connect(&url)).await {
                Ok(Ok(handle)) => {
                    tracing::info!(attempt = generation, "connected to store");
                    Ok(handle)
                }
                Ok(Err(err)) => {
                    tracing::warn!(attempt = generation, error = %err, "store handshake failed");
                    Err(err)
                }
                Err(_) => {
                    tracing::warn!(attempt = generation, ?timeout, "store handshake timed out");
                    Err(ConnectionError::Timeout(timeout))
                }
            }
        }
        .boxed()
        .shared();

        Slot {
            generation,
            attempt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryConnector;

    fn config() -> StoreConfig {
        StoreConfig::default().with_database_url("memory://test")
    }

    #[tokio::test]
    async fn reuses_cached_handle() {
        let manager = ConnectionManager::new(MemoryConnector::new(), &config());

        let first = manager.acquire().await.unwrap();
        let second = manager.acquire().await.unwrap();

        assert_eq!(first.connection_id(), second.connection_id());
        assert_eq!(manager.connector().handshakes(), 1);
        assert_eq!(manager.handshakes(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_acquire_shares_one_handshake() {
        let connector = MemoryConnector::new().with_delay(Duration::from_millis(50));
        let manager = Arc::new(ConnectionManager::new(connector, &config()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.acquire().await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            let conn = handle.await.expect("task panicked").expect("acquire failed");
            ids.push(conn.connection_id());
        }

        assert_eq!(manager.connector().handshakes(), 1);
        assert!(ids.iter().all(|id| *id == ids[0]));
    }

    #[tokio::test]
    async fn missing_url_fails_without_handshake() {
        let manager = ConnectionManager::new(MemoryConnector::new(), &StoreConfig::default());

        let err = manager.acquire().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Configuration {
                variable: DATABASE_URL_VAR
            }
        ));
        assert!(!manager.is_configured());
        assert_eq!(manager.connector().handshakes(), 0);
        assert_eq!(manager.handshakes(), 0);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_failure_then_next_call_retries() {
        let connector = MemoryConnector::failing("authentication failed")
            .with_delay(Duration::from_millis(50));
        let manager = Arc::new(ConnectionManager::new(connector, &config()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.acquire().await })
            })
            .collect();

        for handle in handles {
            let err = handle.await.expect("task panicked").unwrap_err();
            assert!(matches!(
                err,
                Error::Connection(ConnectionError::Handshake(ref msg))
                    if msg == "authentication failed"
            ));
        }
        assert_eq!(manager.connector().handshakes(), 1);

        // No automatic retry, but a later call starts over
        assert!(manager.acquire().await.is_err());
        assert_eq!(manager.connector().handshakes(), 2);
    }

    #[tokio::test]
    async fn unhealthy_handle_is_replaced() {
        let manager = ConnectionManager::new(MemoryConnector::new(), &config());

        let first = manager.acquire().await.unwrap();
        manager.connector().drop_connections();
        let second = manager.acquire().await.unwrap();

        assert_ne!(first.connection_id(), second.connection_id());
        assert_eq!(manager.connector().handshakes(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn handshake_is_bounded_by_timeout() {
        let connector = MemoryConnector::new().with_delay(Duration::from_secs(60));
        let config = config().with_connect_timeout(Duration::from_secs(2));
        let manager = ConnectionManager::new(connector, &config);

        let err = manager.acquire().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Connection(ConnectionError::Timeout(d)) if d == Duration::from_secs(2)
        ));
    }
}
