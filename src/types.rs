//! Core type definitions for the model runtime
//!
//! Includes column types, column definitions, and the per-type value
//! checking and normalization rules used by coercion and validation.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column type definition with value checking and normalization rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    /// Text field
    String,

    /// 64-bit integer field
    Integer,

    /// Arbitrary-precision decimal field
    Decimal,

    /// Boolean field
    Boolean,

    /// Datetime field, always normalized to UTC RFC 3339
    Datetime,

    /// JSON field holding any parsed structure
    Json,

    /// Enum field with allowed values
    Enum {
        /// List of allowed string values
        values: Vec<String>,
    },
}

impl ColumnType {
    /// Canonical rule name for this type ("string", "integer", ...)
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Datetime => "datetime",
            ColumnType::Json => "json",
            ColumnType::Enum { .. } => "enum",
        }
    }

    /// Check that a JSON value is compatible with this column type
    ///
    /// Null is always accepted; emptiness is the `required` rule's concern,
    /// not type checking. Any input the coercion rules below can convert
    /// is accepted: numeric and boolean strings, and every datetime form
    /// `normalize_datetime` parses, so validation agrees with coercion on
    /// paths that never coerce.
    pub fn check_value(&self, value: &Value) -> Result<(), String> {
        if value.is_null() {
            return Ok(());
        }

        match (self, value) {
            (ColumnType::String, Value::String(_)) => Ok(()),
            (ColumnType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
            (ColumnType::Integer, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(|_| ())
                .map_err(|_| format!("cannot convert '{}' to integer", s)),
            (ColumnType::Decimal, Value::Number(_)) => Ok(()),
            (ColumnType::Decimal, Value::String(s)) => Decimal::from_str(s.trim())
                .map(|_| ())
                .map_err(|_| format!("cannot convert '{}' to decimal", s)),
            (ColumnType::Boolean, Value::Bool(_)) => Ok(()),
            (ColumnType::Boolean, Value::String(s)) => match parse_boolean(s) {
                Some(_) => Ok(()),
                None => Err(format!("cannot convert '{}' to boolean", s)),
            },
            (ColumnType::Datetime, value @ (Value::String(_) | Value::Number(_))) => {
                match normalize_datetime(value) {
                    Some(_) => Ok(()),
                    None => Err(format!("invalid datetime: {}", value)),
                }
            }
            (ColumnType::Json, _) => Ok(()),
            (ColumnType::Enum { values }, Value::String(s)) => {
                if values.contains(s) {
                    Ok(())
                } else {
                    Err(format!("value '{}' not in enum values: {:?}", s, values))
                }
            }
            _ => Err(format!("type mismatch: expected {}, got {}", self.name(), value)),
        }
    }

    /// Normalize a value into this column type's canonical representation
    ///
    /// Returns the coerced value, or the input unchanged when no conversion
    /// applies. Uncoercible values are left as-is for validation to report,
    /// except malformed JSON text which degrades to `Null`.
    pub fn coerce_value(&self, value: Value) -> Value {
        match (self, value) {
            (ColumnType::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(s),
            },
            (ColumnType::Decimal, Value::String(s)) => match Decimal::from_str(s.trim()) {
                Ok(d) => Value::String(d.normalize().to_string()),
                Err(_) => Value::String(s),
            },
            (ColumnType::Boolean, Value::String(s)) => match parse_boolean(&s) {
                Some(b) => Value::Bool(b),
                None => Value::String(s),
            },
            (ColumnType::Datetime, value) => match normalize_datetime(&value) {
                Some(ts) => Value::String(ts),
                None => value,
            },
            (ColumnType::Json, Value::String(s)) => {
                serde_json::from_str(&s).unwrap_or(Value::Null)
            }
            (_, value) => value,
        }
    }
}

fn parse_boolean(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Normalize a datetime value into a UTC RFC 3339 string
///
/// Accepts RFC 3339 strings, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`
/// strings, and epoch numbers (seconds, or milliseconds for magnitudes
/// beyond the year-33658 second range).
pub fn normalize_datetime(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc).to_rfc3339());
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt.and_utc().to_rfc3339());
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Some(date.and_hms_opt(0, 0, 0)?.and_utc().to_rfc3339());
            }
            None
        }
        Value::Number(n) => {
            let epoch = n.as_i64()?;
            let dt = if epoch.abs() >= 1_000_000_000_000 {
                DateTime::<Utc>::from_timestamp_millis(epoch)?
            } else {
                DateTime::<Utc>::from_timestamp(epoch, 0)?
            };
            Some(dt.to_rfc3339())
        }
        _ => None,
    }
}

fn default_nullable() -> bool {
    true
}

/// Column definition for a model schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,

    /// Column type with checking rules
    #[serde(flatten)]
    pub column_type: ColumnType,

    /// Whether the column allows null values (default: true); non-nullable
    /// columns get a `required` validation derived at init
    #[serde(default = "default_nullable")]
    pub nullable: bool,

    /// Whether the column carries a uniqueness constraint (default: false);
    /// enforcement is the adapter's concern
    #[serde(default)]
    pub unique: bool,
}

impl ColumnDefinition {
    /// Create a new column definition with a name and type
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            unique: false,
        }
    }

    /// Set the column as non-nullable
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set the column as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}
