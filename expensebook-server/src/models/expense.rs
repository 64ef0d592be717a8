//! Expense record - one recorded financial transaction
//!
//! `category` is a free-text label, not a reference to a Category record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{Document, FieldSpec, Schema};
use super::{Record, RecordKind, RecordMeta, ValidationError};

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("title", 4, 20),
    FieldSpec::number("amount", 0.0),
    FieldSpec::text("category", 4, 20),
    FieldSpec::date("date"),
];

pub const EXPENSE_SCHEMA: Schema = Schema {
    kind: RecordKind::Expense,
    fields: FIELDS,
};

/// Stored expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Expense {
    const SCHEMA: &'static Schema = &EXPENSE_SCHEMA;

    fn from_document(mut doc: Document, meta: RecordMeta) -> Result<Self, ValidationError> {
        Ok(Self {
            id: meta.id,
            title: doc.take_text("title")?,
            amount: doc.take_number("amount")?,
            category: doc.take_text("category")?,
            date: doc.take_date("date")?,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{normalize, Rule};
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn normalizes_valid_candidate() {
        let expense: Expense = normalize(&json!({
            "title": "Groceries",
            "amount": 42.5,
            "category": "Food",
            "date": "2024-01-01"
        }))
        .unwrap();

        assert_eq!(expense.title, "Groceries");
        assert_eq!(expense.amount, 42.5);
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.date, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(!expense.id.is_nil());
        assert_eq!(expense.created_at, expense.updated_at);
    }

    #[test]
    fn rejects_each_single_violation() {
        let base = json!({
            "title": "Groceries",
            "amount": 5,
            "category": "Food",
            "date": "2024-01-01"
        });

        let cases = [
            ("title", json!(""), Rule::Required),
            ("title", json!("ab"), Rule::TooShort { min: 4 }),
            ("amount", json!(-1), Rule::BelowMinimum { min: 0.0 }),
            ("category", json!("Foo"), Rule::TooShort { min: 4 }),
            ("category", json!("c".repeat(21)), Rule::TooLong { max: 20 }),
            ("date", serde_json::Value::Null, Rule::Required),
        ];

        for (field, value, rule) in cases {
            let mut candidate = base.clone();
            candidate[field] = value;
            let err = normalize::<Expense>(&candidate).unwrap_err();
            assert_eq!(err.kind, RecordKind::Expense);
            assert_eq!(err.violations.len(), 1, "{field}");
            assert_eq!(err.rule_for(field), Some(&rule), "{field}");
        }
    }

    #[test]
    fn missing_date_is_required() {
        let err = normalize::<Expense>(&json!({
            "title": "Groceries",
            "amount": 5,
            "category": "Food"
        }))
        .unwrap_err();
        assert_eq!(err.rule_for("date"), Some(&Rule::Required));
    }

    #[test]
    fn serializes_with_document_keys() {
        let expense: Expense = normalize(&json!({
            "title": "Rent",
            "amount": 900,
            "category": "Housing",
            "date": "2024-02-01T00:00:00Z"
        }))
        .unwrap();

        let value = serde_json::to_value(&expense).unwrap();
        assert_eq!(value["_id"], json!(expense.id.to_string()));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["amount"], json!(900.0));
    }
}
