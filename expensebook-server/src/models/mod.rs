//! Record models with validation at construction
//!
//! Every record kind is described by a static `Schema`. Untyped input is
//! checked against it and only then turned into a typed record with a fresh
//! identity and timestamps. Invalid input returns ValidationError, not panic.

pub mod category;
pub mod expense;
pub mod schema;
pub mod user;
pub mod validation;

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use uuid::Uuid;

pub use category::{Category, CategoryType};
pub use expense::Expense;
pub use schema::{Document, FieldSpec, FieldType, FieldValue, Schema};
pub use user::User;
pub use validation::{FieldViolation, Rule, ValidationError};

/// The persisted record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Expense,
    Category,
    User,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Category => "category",
            Self::User => "user",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and timestamps attached to every record on creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordMeta {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    /// Fresh identity, both timestamps set to now at microsecond precision.
    pub fn new() -> Self {
        let now = Utc::now().trunc_subsecs(6);
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// A record kind with a fixed schema
pub trait Record: Sized {
    const SCHEMA: &'static Schema;

    /// Build the typed record from a validated document.
    fn from_document(doc: Document, meta: RecordMeta) -> Result<Self, ValidationError>;
}

/// Validate an untyped candidate and attach identity and timestamps.
pub fn normalize<R: Record>(candidate: &Value) -> Result<R, ValidationError> {
    let doc = R::SCHEMA.validate(candidate)?;
    R::from_document(doc, RecordMeta::new())
}
