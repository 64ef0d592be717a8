//! expensebook-server: storage core and HTTP surface for expense tracking
//!
//! Validates expense, category and user records against declarative
//! schemas, persists them through a lazily connected record store, and
//! exposes the expense endpoints over HTTP with `{ success, data | message }`
//! envelopes.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod store;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use store::RecordStore;
