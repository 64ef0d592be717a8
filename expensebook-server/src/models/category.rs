//! Category record - a named classification bucket
//!
//! Names are unique across all categories. Expenses do not reference
//! categories; they carry their own free-text label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{Document, FieldSpec, Schema};
use super::{Record, RecordKind, RecordMeta, Rule, ValidationError};

/// Allowed values of `type`
const CATEGORY_TYPES: &[&str] = &["expense", "income"];

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name", 4, 20).unique(),
    FieldSpec::one_of("type", CATEGORY_TYPES),
];

pub const CATEGORY_SCHEMA: Schema = Schema {
    kind: RecordKind::Category,
    fields: FIELDS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Expense,
    Income,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "expense" => Some(Self::Expense),
            "income" => Some(Self::Income),
            _ => None,
        }
    }
}

/// Stored category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Category {
    const SCHEMA: &'static Schema = &CATEGORY_SCHEMA;

    fn from_document(mut doc: Document, meta: RecordMeta) -> Result<Self, ValidationError> {
        let name = doc.take_text("name")?;
        let raw_type = doc.take_text("type")?;
        let kind = CategoryType::parse(&raw_type).ok_or_else(|| {
            ValidationError::single(
                RecordKind::Category,
                "type",
                Rule::NotAllowed {
                    value: raw_type.clone(),
                    allowed: CATEGORY_TYPES,
                },
            )
        })?;

        Ok(Self {
            id: meta.id,
            name,
            kind,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        })
    }
}
