//! Validation error types

use std::fmt;

use super::RecordKind;

/// The rule a field value broke
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Field is absent, null, or an empty string
    Required,

    /// JSON value has the wrong type (e.g. a string where a number belongs)
    WrongType { expected: &'static str },

    /// Text shorter than the inclusive lower bound
    TooShort { min: usize },

    /// Text longer than the inclusive upper bound
    TooLong { max: usize },

    /// Text contains a NUL character, which the store cannot hold
    ContainsNul,

    /// Number below the inclusive lower bound
    BelowMinimum { min: f64 },

    /// Value outside an enumeration
    NotAllowed {
        value: String,
        allowed: &'static [&'static str],
    },
}

/// One offending field and the rule it broke
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub rule: Rule,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match &self.rule {
            Rule::Required => write!(f, "{} is required", field),
            Rule::WrongType { expected } => write!(f, "{} must be a {}", field, expected),
            Rule::TooShort { min } => {
                write!(f, "{} must be at least {} characters", field, min)
            }
            Rule::TooLong { max } => {
                write!(f, "{} must be at most {} characters", field, max)
            }
            Rule::ContainsNul => write!(f, "{} must not contain NUL characters", field),
            Rule::BelowMinimum { min } => write!(f, "{} must be at least {}", field, min),
            Rule::NotAllowed { value, allowed } => write!(
                f,
                "invalid {} value: '{}' (expected one of: {})",
                field,
                value,
                allowed.join(", ")
            ),
        }
    }
}

/// Candidate record rejected by its schema.
///
/// Carries every violation found, in schema field order, so callers can
/// surface all of them at once.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub kind: RecordKind,
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Error with exactly one violation.
    pub fn single(kind: RecordKind, field: &'static str, rule: Rule) -> Self {
        Self {
            kind,
            violations: vec![FieldViolation { field, rule }],
        }
    }

    /// Rule broken by `field`, if that field is among the violations.
    pub fn rule_for(&self, field: &str) -> Option<&Rule> {
        self.violations
            .iter()
            .find(|v| v.field == field)
            .map(|v| &v.rule)
    }

    /// Names of the offending fields.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.violations.iter().map(|v| v.field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed: ", self.kind)?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
