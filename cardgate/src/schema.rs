//! Declarative parameter schemas and the generic validator that consumes them.
//!
//! A schema is a static table of [`SchemaField`]s. [`validate`] checks a
//! caller-supplied JSON object against it and returns a normalized copy.
//! Fields the schema does not declare are passed through untouched, since the
//! gateway accepts optional fields this client does not know about.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::ValidationError;

/// Validated transaction fields keyed by name.
pub type Params = Map<String, Value>;

/// Value kind a schema field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// A JSON number, or a string that parses as a finite number.
    Number,
    /// A JSON string.
    String,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Number => "number",
            Self::String => "string",
        })
    }
}

/// One declared field of an operation schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    /// Field name as sent to the gateway.
    pub name: &'static str,
    /// Accepted value kind.
    pub kind: FieldKind,
    /// Whether the field must be present.
    pub required: bool,
    /// Maximum length in characters, for string values.
    pub max_length: Option<usize>,
}

impl SchemaField {
    /// Declares a required field.
    #[must_use]
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            max_length: None,
        }
    }

    /// Declares an optional field.
    #[must_use]
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            max_length: None,
        }
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}

/// Validates `params` against `schema`.
///
/// Required fields must be present and non-null. Numeric strings are coerced
/// to JSON numbers; `null` optional fields are dropped. The caller's value is
/// never modified.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the first field that violates the
/// schema, or [`ValidationError::not_an_object`] if `params` is not an object.
pub fn validate(schema: &[SchemaField], params: &Value) -> Result<Params, ValidationError> {
    let Some(input) = params.as_object() else {
        return Err(ValidationError::not_an_object());
    };

    let mut normalized = input.clone();
    for field in schema {
        match input.get(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    return Err(ValidationError::missing(field.name));
                }
                normalized.remove(field.name);
            }
            Some(value) => {
                let checked = check_field(field, value)?;
                normalized.insert(field.name.to_owned(), checked);
            }
        }
    }
    Ok(normalized)
}

fn check_field(field: &SchemaField, value: &Value) -> Result<Value, ValidationError> {
    match (field.kind, value) {
        (FieldKind::Number, Value::Number(_)) => Ok(value.clone()),
        (FieldKind::Number, Value::String(raw)) => parse_number(raw)
            .map(Value::Number)
            .ok_or_else(|| ValidationError::wrong_kind(field.name, FieldKind::Number)),
        (FieldKind::String, Value::String(s)) => {
            if let Some(max) = field.max_length {
                let actual = s.chars().count();
                if actual > max {
                    return Err(ValidationError::too_long(field.name, max, actual));
                }
            }
            Ok(value.clone())
        }
        (kind, _) => Err(ValidationError::wrong_kind(field.name, kind)),
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    let trimmed = raw.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Number::from(int));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}
