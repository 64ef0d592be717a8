//! User record - credentials
//!
//! The password is stored exactly as supplied; no hashing scheme is
//! defined for this record yet. It is never serialized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{Document, FieldSpec, Schema};
use super::{Record, RecordKind, RecordMeta, ValidationError};

// The 20 character bound on email rejects most real addresses. Kept as the
// store's existing contract.
const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("username", 4, 20).unique(),
    FieldSpec::text("email", 4, 20).unique(),
    FieldSpec::text("password", 4, 20),
];

pub const USER_SCHEMA: Schema = Schema {
    kind: RecordKind::User,
    fields: FIELDS,
};

/// Stored user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for User {
    const SCHEMA: &'static Schema = &USER_SCHEMA;

    fn from_document(mut doc: Document, meta: RecordMeta) -> Result<Self, ValidationError> {
        Ok(Self {
            id: meta.id,
            username: doc.take_text("username")?,
            email: doc.take_text("email")?,
            password: doc.take_text("password")?,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        })
    }
}
