//! Record store - list and create operations
//!
//! Every create validates first, then acquires the connection, runs the
//! uniqueness lookups, and inserts. An invalid candidate never reaches the
//! store. The connection manager is injected; there is no global handle.

use std::sync::Arc;

use serde_json::Value;

use crate::db::{Collections, ConnectionManager, Connector, DbError};
use crate::error::{Error, Result};
use crate::models::{Category, Expense, Record, RecordKind, RecordMeta, User};

/// Unique field values of a candidate, captured before insert
type UniqueValues = Vec<(&'static str, String)>;

/// Entry point for the route layer
pub struct RecordStore<C: Connector> {
    connections: Arc<ConnectionManager<C>>,
}

impl<C: Connector> Clone for RecordStore<C> {
    fn clone(&self) -> Self {
        Self {
            connections: Arc::clone(&self.connections),
        }
    }
}

impl<C: Connector> RecordStore<C> {
    pub fn new(connections: Arc<ConnectionManager<C>>) -> Self {
        Self { connections }
    }

    pub fn connections(&self) -> &ConnectionManager<C> {
        &self.connections
    }

    /// All expenses in store-native order; empty when there are none.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let handle = self.connections.acquire().await?;
        let expenses = handle.find_expenses().await?;
        tracing::debug!(count = expenses.len(), "listed expenses");
        Ok(expenses)
    }

    /// Validate and persist an expense, returning the stored record.
    pub async fn create_expense(&self, candidate: &Value) -> Result<Expense> {
        let (expense, unique) = prepare::<Expense>(candidate)?;
        let handle = self.connections.acquire().await?;
        check_unique(&handle, RecordKind::Expense, &unique).await?;

        handle
            .insert_expense(&expense)
            .await
            .map_err(|e| insert_error(e, &unique))?;

        tracing::debug!(id = %expense.id, "created expense");
        Ok(expense)
    }

    /// All categories in store-native order.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let handle = self.connections.acquire().await?;
        Ok(handle.find_categories().await?)
    }

    /// Validate and persist a category; names are unique.
    pub async fn create_category(&self, candidate: &Value) -> Result<Category> {
        let (category, unique) = prepare::<Category>(candidate)?;
        let handle = self.connections.acquire().await?;
        check_unique(&handle, RecordKind::Category, &unique).await?;

        handle
            .insert_category(&category)
            .await
            .map_err(|e| insert_error(e, &unique))?;

        tracing::debug!(id = %category.id, name = %category.name, "created category");
        Ok(category)
    }

    /// Validate and persist a user; username and email are unique.
    pub async fn create_user(&self, candidate: &Value) -> Result<User> {
        let (user, unique) = prepare::<User>(candidate)?;
        let handle = self.connections.acquire().await?;
        check_unique(&handle, RecordKind::User, &unique).await?;

        handle
            .insert_user(&user)
            .await
            .map_err(|e| insert_error(e, &unique))?;

        tracing::debug!(id = %user.id, "created user");
        Ok(user)
    }
}

/// Validate, capture unique values, and build the normalized record.
fn prepare<R: Record>(candidate: &Value) -> Result<(R, UniqueValues)> {
    let doc = R::SCHEMA.validate(candidate)?;
    let unique = R::SCHEMA
        .unique_values(&doc)
        .into_iter()
        .map(|(field, value)| (field, value.to_owned()))
        .collect();
    let record = R::from_document(doc, RecordMeta::new())?;
    Ok((record, unique))
}

async fn check_unique<H: Collections>(
    handle: &H,
    kind: RecordKind,
    unique: &UniqueValues,
) -> Result<()> {
    for (field, value) in unique {
        if handle.exists(kind, *field, value).await? {
            return Err(Error::Uniqueness {
                kind,
                field: *field,
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// A duplicate that slipped past the lookup (concurrent insert) is still a
/// uniqueness violation.
fn insert_error(err: DbError, unique: &UniqueValues) -> Error {
    match err {
        DbError::Duplicate { kind, field } => {
            match unique.iter().find(|(f, _)| *f == field) {
                Some((_, value)) => Error::Uniqueness {
                    kind,
                    field,
                    value: value.clone(),
                },
                None => Error::Store(DbError::Duplicate { kind, field }),
            }
        }
        other => Error::Store(other),
    }
}
