//! HTTP server command
//!
//! Runs the expense API against PostgreSQL, or against the in-process
//! store with `--in-memory`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use expensebook_server::db::{ConnectionManager, Connector, MemoryConnector, PgConnector};
use expensebook_server::http::{run_server, ServerConfig};
use expensebook_server::{RecordStore, StoreConfig};

/// URL handed to the in-process store when none is configured
const IN_MEMORY_URL: &str = "memory://local";

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Database URL (overrides environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Handshake timeout in seconds (overrides EXPENSEBOOK_CONNECT_TIMEOUT_SECS)
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Keep records in process memory instead of PostgreSQL
    #[arg(long)]
    pub in_memory: bool,
}

impl ServeArgs {
    fn store_config(&self) -> StoreConfig {
        let mut config = StoreConfig::from_env();
        if let Some(url) = self.database_url.as_deref().filter(|u| !u.trim().is_empty()) {
            config = config.with_database_url(url.trim());
        }
        if let Some(secs) = self.connect_timeout {
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }
        if self.in_memory && config.database_url.is_none() {
            config = config.with_database_url(IN_MEMORY_URL);
        }
        config
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::new(self.host, self.port),
            cors_permissive: self.cors_permissive,
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let store_config = args.store_config();
    let server_config = args.server_config();

    if args.in_memory {
        tracing::info!("using in-memory store; records are lost on exit");
        serve_with(MemoryConnector::new(), &store_config, server_config).await
    } else {
        serve_with(PgConnector::new(&store_config), &store_config, server_config).await
    }
}

async fn serve_with<C: Connector>(
    connector: C,
    store_config: &StoreConfig,
    server_config: ServerConfig,
) -> Result<()> {
    let manager = ConnectionManager::new(connector, store_config);
    let store = RecordStore::new(Arc::new(manager));

    // Run server (blocks until shutdown)
    run_server(store, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
