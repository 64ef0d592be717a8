//! Declarative record schemas
//!
//! A schema lists the fields of one record kind with their type, bounds,
//! and flags. `Schema::validate` checks an untyped JSON candidate against it
//! and yields a `Document` of typed values. Nothing is coerced: a string
//! where a number belongs is a type error.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde_json::Value;

use super::validation::{FieldViolation, Rule, ValidationError};
use super::RecordKind;

/// Pseudo-field reported when the candidate is not a JSON object
pub const DOCUMENT_FIELD: &str = "document";

/// Value type and bounds of a field
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    /// Text with inclusive character-count bounds
    Text { min_len: usize, max_len: usize },
    /// Number with an inclusive lower bound
    Number { min: f64 },
    /// Calendar date/time
    Date,
    /// One of a fixed set of strings
    Enum(&'static [&'static str]),
}

/// One declared field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    /// Store must hold at most one record with a given value
    pub unique: bool,
}

impl FieldSpec {
    pub const fn text(name: &'static str, min_len: usize, max_len: usize) -> Self {
        Self {
            name,
            ty: FieldType::Text { min_len, max_len },
            required: true,
            unique: false,
        }
    }

    pub const fn number(name: &'static str, min: f64) -> Self {
        Self {
            name,
            ty: FieldType::Number { min },
            required: true,
            unique: false,
        }
    }

    pub const fn date(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::Date,
            required: true,
            unique: false,
        }
    }

    pub const fn one_of(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            name,
            ty: FieldType::Enum(allowed),
            required: true,
            unique: false,
        }
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Check a single raw value. `Ok(None)` means an optional field was absent.
    fn check(&self, raw: Option<&Value>) -> Result<Option<FieldValue>, Rule> {
        let raw = match raw {
            None | Some(Value::Null) => return self.missing(),
            Some(Value::String(s)) if s.is_empty() => return self.missing(),
            Some(v) => v,
        };

        match self.ty {
            FieldType::Text { min_len, max_len } => {
                let s = raw.as_str().ok_or(Rule::WrongType { expected: "string" })?;
                if s.contains('\0') {
                    return Err(Rule::ContainsNul);
                }
                let len = s.chars().count();
                if len < min_len {
                    return Err(Rule::TooShort { min: min_len });
                }
                if len > max_len {
                    return Err(Rule::TooLong { max: max_len });
                }
                Ok(Some(FieldValue::Text(s.to_owned())))
            }
            FieldType::Number { min } => {
                let n = raw.as_f64().ok_or(Rule::WrongType { expected: "number" })?;
                if n < min {
                    return Err(Rule::BelowMinimum { min });
                }
                Ok(Some(FieldValue::Number(n)))
            }
            FieldType::Date => parse_date(raw)
                .map(|d| Some(FieldValue::Date(d)))
                .ok_or(Rule::WrongType { expected: "date" }),
            FieldType::Enum(allowed) => {
                let s = raw.as_str().ok_or(Rule::WrongType { expected: "string" })?;
                if !allowed.contains(&s) {
                    return Err(Rule::NotAllowed {
                        value: s.to_owned(),
                        allowed,
                    });
                }
                Ok(Some(FieldValue::Text(s.to_owned())))
            }
        }
    }

    fn missing(&self) -> Result<Option<FieldValue>, Rule> {
        if self.required {
            Err(Rule::Required)
        } else {
            Ok(None)
        }
    }
}

/// Field set of one record kind
#[derive(Debug)]
pub struct Schema {
    pub kind: RecordKind,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Validate a candidate, collecting every violation.
    ///
    /// Undeclared keys are ignored, which also drops client-supplied
    /// identity and timestamps.
    pub fn validate(&self, candidate: &Value) -> Result<Document, ValidationError> {
        let Some(map) = candidate.as_object() else {
            return Err(ValidationError::single(
                self.kind,
                DOCUMENT_FIELD,
                Rule::WrongType { expected: "object" },
            ));
        };

        let mut values = BTreeMap::new();
        let mut violations = Vec::new();

        for spec in self.fields {
            match spec.check(map.get(spec.name)) {
                Ok(Some(value)) => {
                    values.insert(spec.name, value);
                }
                Ok(None) => {}
                Err(rule) => violations.push(FieldViolation {
                    field: spec.name,
                    rule,
                }),
            }
        }

        if !violations.is_empty() {
            return Err(ValidationError {
                kind: self.kind,
                violations,
            });
        }

        Ok(Document {
            kind: self.kind,
            values,
        })
    }

    /// Values of the unique-flagged fields present in `doc`, in schema order.
    pub fn unique_values<'d>(&self, doc: &'d Document) -> Vec<(&'static str, &'d str)> {
        self.fields
            .iter()
            .filter(|spec| spec.unique)
            .filter_map(|spec| match doc.values.get(spec.name) {
                Some(FieldValue::Text(s)) => Some((spec.name, s.as_str())),
                _ => None,
            })
            .collect()
    }
}

/// A typed, validated field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
}

/// Validated field values of one candidate record
#[derive(Debug, Clone)]
pub struct Document {
    kind: RecordKind,
    values: BTreeMap<&'static str, FieldValue>,
}

impl Document {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Remove a text (or enum) field.
    pub fn take_text(&mut self, field: &'static str) -> Result<String, ValidationError> {
        match self.values.remove(field) {
            Some(FieldValue::Text(s)) => Ok(s),
            other => Err(self.mismatch(field, other, "string")),
        }
    }

    pub fn take_number(&mut self, field: &'static str) -> Result<f64, ValidationError> {
        match self.values.remove(field) {
            Some(FieldValue::Number(n)) => Ok(n),
            other => Err(self.mismatch(field, other, "number")),
        }
    }

    pub fn take_date(&mut self, field: &'static str) -> Result<DateTime<Utc>, ValidationError> {
        match self.values.remove(field) {
            Some(FieldValue::Date(d)) => Ok(d),
            other => Err(self.mismatch(field, other, "date")),
        }
    }

    fn mismatch(
        &self,
        field: &'static str,
        found: Option<FieldValue>,
        expected: &'static str,
    ) -> ValidationError {
        let rule = match found {
            None => Rule::Required,
            Some(_) => Rule::WrongType { expected },
        };
        ValidationError::single(self.kind, field, rule)
    }
}

/// Parse a JSON date value.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC), a bare
/// `YYYY-MM-DD` (midnight UTC), or an integer of epoch milliseconds.
/// Precision is cut to microseconds, the finest the store keeps.
pub fn parse_date(raw: &Value) -> Option<DateTime<Utc>> {
    parse_date_exact(raw).map(|d| d.trunc_subsecs(6))
}

fn parse_date_exact(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(naive.and_utc());
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}
