//! Schema definition for a model's backing table
//!
//! `Table` holds the ordered column list, normalizes candidate records in
//! place before validation, and strips non-accessible fields from
//! mass-assignment input.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::record::Record;
use crate::types::ColumnDefinition;

/// Table schema: ordered column names plus their definitions
///
/// Column order is declaration order; it drives validation iteration and
/// record materialization. The column set is fixed after construction.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    keys: Vec<String>,
    columns: HashMap<String, ColumnDefinition>,
}

impl Table {
    /// Create a table from an ordered list of column definitions
    ///
    /// A repeated column name keeps its first position; the later
    /// definition wins.
    pub fn new(name: impl Into<String>, definitions: Vec<ColumnDefinition>) -> Self {
        let mut keys = Vec::with_capacity(definitions.len());
        let mut columns = HashMap::with_capacity(definitions.len());

        for definition in definitions {
            if !columns.contains_key(&definition.name) {
                keys.push(definition.name.clone());
            }
            columns.insert(definition.name.clone(), definition);
        }

        Self {
            name: name.into(),
            keys,
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in declaration order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Columns in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.keys.iter().filter_map(|key| self.columns.get(key))
    }

    /// Normalize a candidate record's field types in place
    ///
    /// Integer/decimal/boolean strings become typed values, datetimes are
    /// normalized to UTC RFC 3339, and JSON text is parsed (degrading to
    /// null when malformed). Uncoercible values are left untouched for
    /// validation to report.
    pub fn coerce(&self, record: &mut Record) {
        for key in &self.keys {
            let Some(definition) = self.columns.get(key) else {
                continue;
            };
            let Some(value) = record.get(key) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let coerced = definition.column_type.coerce_value(value.clone());
            record.set(key.clone(), coerced);
        }
    }

    /// Strip fields not present in the accessible set (mass-assignment
    /// protection) and fields that are not schema columns
    pub fn filter(&self, attributes: &Value, accessible: &HashSet<String>) -> Map<String, Value> {
        let mut filtered = Map::new();

        if let Value::Object(attrs) = attributes {
            for key in &self.keys {
                if !accessible.contains(key) {
                    continue;
                }
                if let Some(value) = attrs.get(key) {
                    filtered.insert(key.clone(), value.clone());
                }
            }
        }

        filtered
    }
}

/// Derive a table name from a model name: underscore, then pluralize
///
/// `"Item"` becomes `"items"`, `"CartItem"` becomes `"cart_items"`,
/// `"Category"` becomes `"categories"`.
pub fn tableize(name: &str) -> String {
    pluralize(&underscore(name))
}

fn underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;

    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }

    out
}

fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')) {
            return format!("{}ies", stem);
        }
    }
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{}es", word);
    }
    format!("{}s", word)
}
