//! In-memory store implementation
//!
//! Keeps records in process memory. Used by tests and for running the
//! server without a database; data is lost when the process exits.
//! Insertion order is the store-native order.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::collections::{Collections, DbError};
use super::connection::{ConnectionError, Connector};
use crate::models::{Category, Expense, RecordKind, User};

#[derive(Debug, Default)]
struct Data {
    expenses: Vec<Expense>,
    categories: Vec<Category>,
    users: Vec<User>,
}

/// Handle onto the in-memory collections.
///
/// Clones share the same data. Each handshake hands out a clone tagged
/// with a new connection id.
#[derive(Debug, Clone)]
pub struct MemoryCollections {
    data: Arc<RwLock<Data>>,
    unavailable: Arc<AtomicBool>,
    connection_id: usize,
}

impl MemoryCollections {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(Data::default())),
            unavailable: Arc::new(AtomicBool::new(false)),
            connection_id: 0,
        }
    }

    /// Id of the handshake that produced this handle (0 if none).
    pub fn connection_id(&self) -> usize {
        self.connection_id
    }

    /// Make every read and write fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn with_connection(&self, connection_id: usize) -> Self {
        Self {
            connection_id,
            ..self.clone()
        }
    }

    fn check_available(&self) -> Result<(), DbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("in-memory store switched off".into()));
        }
        Ok(())
    }
}

impl Default for MemoryCollections {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collections for MemoryCollections {
    async fn find_expenses(&self) -> Result<Vec<Expense>, DbError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data.expenses.clone())
    }

    async fn insert_expense(&self, expense: &Expense) -> Result<(), DbError> {
        self.check_available()?;
        let mut data = self.data.write().await;

        if data.expenses.iter().any(|e| e.id == expense.id) {
            return Err(DbError::Duplicate {
                kind: RecordKind::Expense,
                field: "_id",
            });
        }

        data.expenses.push(expense.clone());
        Ok(())
    }

    async fn find_categories(&self) -> Result<Vec<Category>, DbError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data.categories.clone())
    }

    async fn insert_category(&self, category: &Category) -> Result<(), DbError> {
        self.check_available()?;
        let mut data = self.data.write().await;

        let duplicate = data.categories.iter().find_map(|c| {
            if c.id == category.id {
                Some("_id")
            } else if c.name == category.name {
                Some("name")
            } else {
                None
            }
        });
        if let Some(field) = duplicate {
            return Err(DbError::Duplicate {
                kind: RecordKind::Category,
                field,
            });
        }

        data.categories.push(category.clone());
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<(), DbError> {
        self.check_available()?;
        let mut data = self.data.write().await;

        let duplicate = data.users.iter().find_map(|u| {
            if u.id == user.id {
                Some("_id")
            } else if u.username == user.username {
                Some("username")
            } else if u.email == user.email {
                Some("email")
            } else {
                None
            }
        });
        if let Some(field) = duplicate {
            return Err(DbError::Duplicate {
                kind: RecordKind::User,
                field,
            });
        }

        data.users.push(user.clone());
        Ok(())
    }

    async fn exists(
        &self,
        kind: RecordKind,
        field: &'static str,
        value: &str,
    ) -> Result<bool, DbError> {
        self.check_available()?;
        let data = self.data.read().await;

        let found = match (kind, field) {
            (RecordKind::Category, "name") => data.categories.iter().any(|c| c.name == value),
            (RecordKind::User, "username") => data.users.iter().any(|u| u.username == value),
            (RecordKind::User, "email") => data.users.iter().any(|u| u.email == value),
            _ => return Err(DbError::UnknownField { kind, field }),
        };
        Ok(found)
    }
}

/// Connector for the in-memory store.
///
/// Every handshake returns a handle onto the same data. Handshakes can be
/// delayed or made to fail, and existing connections can be dropped, so
/// connection handling can be exercised without a database.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    store: MemoryCollections,
    handshakes: Arc<AtomicUsize>,
    /// Connections with an id at or below this are dead
    dropped_through: Arc<AtomicUsize>,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self {
            store: MemoryCollections::new(),
            handshakes: Arc::new(AtomicUsize::new(0)),
            dropped_through: Arc::new(AtomicUsize::new(0)),
            delay: None,
            failure: None,
        }
    }

    /// Connector whose handshakes always fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// Wait `delay` inside every handshake.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of handshakes performed.
    pub fn handshakes(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    /// Mark every connection made so far as dead.
    pub fn drop_connections(&self) {
        self.dropped_through
            .store(self.handshakes.load(Ordering::SeqCst), Ordering::SeqCst);
    }

    /// The shared data behind every handle.
    pub fn store(&self) -> &MemoryCollections {
        &self.store
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Handle = MemoryCollections;

    async fn connect(&self, _database_url: &str) -> Result<MemoryCollections, ConnectionError> {
        let id = self.handshakes.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(ConnectionError::Handshake(message.clone()));
        }

        Ok(self.store.with_connection(id))
    }

    fn is_healthy(&self, handle: &MemoryCollections) -> bool {
        handle.connection_id() > self.dropped_through.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{normalize, CategoryType};
    use serde_json::json;

    fn category(name: &str) -> Category {
        normalize(&json!({ "name": name, "type": "expense" })).unwrap()
    }

    fn user(username: &str, email: &str) -> User {
        normalize(&json!({ "username": username, "email": email, "password": "pass1234" }))
            .unwrap()
    }

    #[tokio::test]
    async fn preserves_insertion_order() {
        let store = MemoryCollections::new();
        for title in ["Rent", "Food", "Fuel"] {
            let expense: Expense = normalize(&json!({
                "title": format!("{title} bill"),
                "amount": 1,
                "category": "Home",
                "date": "2024-01-01"
            }))
            .unwrap();
            store.insert_expense(&expense).await.unwrap();
        }

        let titles: Vec<_> = store
            .find_expenses()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Rent bill", "Food bill", "Fuel bill"]);
    }

    #[tokio::test]
    async fn duplicate_category_name_error() {
        let store = MemoryCollections::new();
        store.insert_category(&category("Travel")).await.unwrap();

        let result = store.insert_category(&category("Travel")).await;

        assert!(matches!(
            result,
            Err(DbError::Duplicate {
                kind: RecordKind::Category,
                field: "name"
            })
        ));
        let categories = store.find_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].kind, CategoryType::Expense);
    }

    #[tokio::test]
    async fn duplicate_user_fields_error() {
        let store = MemoryCollections::new();
        store.insert_user(&user("alice", "a@mail.io")).await.unwrap();

        let same_name = store.insert_user(&user("alice", "b@mail.io")).await;
        assert!(matches!(same_name, Err(DbError::Duplicate { field: "username", .. })));

        let same_email = store.insert_user(&user("bobby", "a@mail.io")).await;
        assert!(matches!(same_email, Err(DbError::Duplicate { field: "email", .. })));
    }

    #[tokio::test]
    async fn exists_lookup() {
        let store = MemoryCollections::new();
        store.insert_category(&category("Health")).await.unwrap();

        assert!(store.exists(RecordKind::Category, "name", "Health").await.unwrap());
        assert!(!store.exists(RecordKind::Category, "name", "Leisure").await.unwrap());
        assert!(matches!(
            store.exists(RecordKind::Expense, "title", "Rent").await,
            Err(DbError::UnknownField { .. })
        ));
    }

    #[tokio::test]
    async fn unavailable_store_rejects_operations() {
        let store = MemoryCollections::new();
        store.set_unavailable(true);
        assert!(matches!(store.find_expenses().await, Err(DbError::Unavailable(_))));

        store.set_unavailable(false);
        assert!(store.find_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn handles_share_data_across_handshakes() {
        let connector = MemoryConnector::new();
        let first = connector.connect("memory://").await.unwrap();
        first.insert_category(&category("Books")).await.unwrap();

        connector.drop_connections();
        assert!(!connector.is_healthy(&first));

        let second = connector.connect("memory://").await.unwrap();
        assert!(connector.is_healthy(&second));
        assert_eq!(second.connection_id(), 2);
        assert_eq!(second.find_categories().await.unwrap().len(), 1);
    }
}
