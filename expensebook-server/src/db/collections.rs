//! Collection access on a live connection handle
//!
//! The record store only talks to the backing store through this trait, so
//! tests can swap PostgreSQL for the in-memory backend.

use async_trait::async_trait;

use crate::models::{Category, Expense, RecordKind, User};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Store-side unique constraint rejected the write
    #[error("duplicate {kind} {field}")]
    Duplicate {
        kind: RecordKind,
        field: &'static str,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Field has no unique lookup on this collection
    #[error("no unique lookup for {kind}.{field}")]
    UnknownField {
        kind: RecordKind,
        field: &'static str,
    },
}

/// Reads and writes against the expense, category and user collections.
///
/// Implementations:
/// - `PgCollections` - PostgreSQL via sqlx
/// - `MemoryCollections` - in-memory, for tests and local runs
#[async_trait]
pub trait Collections: Send + Sync {
    /// All expenses in store-native order
    async fn find_expenses(&self) -> Result<Vec<Expense>, DbError>;

    /// Insert a normalized expense
    async fn insert_expense(&self, expense: &Expense) -> Result<(), DbError>;

    /// All categories in store-native order
    async fn find_categories(&self) -> Result<Vec<Category>, DbError>;

    /// Insert a normalized category, enforcing unique names
    async fn insert_category(&self, category: &Category) -> Result<(), DbError>;

    /// Insert a normalized user, enforcing unique username and email
    async fn insert_user(&self, user: &User) -> Result<(), DbError>;

    /// Whether a record of `kind` already holds `value` in `field`
    async fn exists(
        &self,
        kind: RecordKind,
        field: &'static str,
        value: &str,
    ) -> Result<bool, DbError>;
}
