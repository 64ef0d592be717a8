//! Database layer - connection lifecycle and collection backends
//!
//! # Design Principles
//!
//! - One cached handle per process, owned by `ConnectionManager`
//! - Concurrent cold callers share a single handshake
//! - Backends sit behind `Connector`/`Collections` so tests run in memory
//! - Unique constraints are enforced by the store, not only by lookups

pub mod collections;
pub mod connection;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;

pub use collections::{Collections, DbError};
pub use connection::{ConnectionError, ConnectionManager, Connector};
pub use memory::{MemoryCollections, MemoryConnector};
pub use pool::{create_pool_with_options, PgConnector};
pub use postgres::PgCollections;
