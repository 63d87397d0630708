//! Materialized model instances
//!
//! A `Record` is one schema-shaped row: every schema column is always
//! present, with datetime and JSON values normalized at build time.
//! Records carry no back-reference into the engine; the instance-level
//! `save`/`update`/`destroy` operations take the owning model explicitly
//! and pre-bind the record's own id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModelError, Result};
use crate::model::Model;
use crate::query::Query;
use crate::schema::Table;
use crate::types::ColumnType;

/// One materialized, type-coerced instance of a model's schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: Map<String, Value>,
}

impl Record {
    pub(crate) fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Build a schema-shaped record from a raw attribute value
    ///
    /// Every schema column is initialized to null, then each column
    /// present in `attributes` is copied in with type-specific coercion:
    /// datetimes are normalized to UTC RFC 3339 (unparseable input
    /// degrades to null), JSON text is parsed (malformed text degrades to
    /// null), everything else is assigned verbatim. A non-object
    /// `attributes` yields an all-null record.
    pub fn materialize(schema: &Table, attributes: &Value) -> Self {
        let mut values = Map::new();
        for key in schema.keys() {
            values.insert(key.clone(), Value::Null);
        }

        if let Value::Object(attrs) = attributes {
            for definition in schema.iter() {
                let Some(raw) = attrs.get(&definition.name) else {
                    continue;
                };
                if raw.is_null() {
                    continue;
                }

                let value = match &definition.column_type {
                    ColumnType::Datetime => crate::types::normalize_datetime(raw)
                        .map(Value::String)
                        .unwrap_or(Value::Null),
                    ColumnType::Json => match raw {
                        Value::String(text) => {
                            serde_json::from_str(text).unwrap_or(Value::Null)
                        }
                        other => other.clone(),
                    },
                    _ => raw.clone(),
                };
                values.insert(definition.name.clone(), value);
            }
        }

        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    /// The identity column value, if present and non-null
    pub fn id(&self) -> Option<&Value> {
        self.values.get("id").filter(|v| !v.is_null())
    }

    /// Whether the column is absent or null
    pub fn is_empty(&self, column: &str) -> bool {
        self.values.get(column).is_none_or(Value::is_null)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, column: &str) -> Option<bool> {
        self.get(column).and_then(Value::as_bool)
    }

    /// Persist this record through the owning model's save lifecycle
    pub async fn save(self, model: &Model) -> Result<Record> {
        model.save(self).await
    }

    /// Update the backing row through the owning model, keyed by this
    /// record's own id
    pub async fn update(self, model: &Model) -> Result<Record> {
        let id = self.id().cloned().ok_or(ModelError::MissingId)?;
        model.update(id, self.into_value()).await
    }

    /// Destroy the backing row through the owning model, keyed by this
    /// record's own id
    pub async fn destroy(self, model: &Model) -> Result<Vec<Record>> {
        let id = self.id().cloned().ok_or(ModelError::MissingId)?;
        model.destroy(Query::by_id(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnDefinition;
    use serde_json::json;

    fn schema() -> Table {
        Table::new(
            "items",
            vec![
                ColumnDefinition::new("id", ColumnType::Integer),
                ColumnDefinition::new("title", ColumnType::String),
                ColumnDefinition::new("posted_at", ColumnType::Datetime),
                ColumnDefinition::new("meta", ColumnType::Json),
            ],
        )
    }

    #[test]
    fn test_materialize_null_yields_all_columns_null() {
        let record = Record::materialize(&schema(), &Value::Null);

        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, ["id", "title", "posted_at", "meta"]);
        assert!(record.is_empty("id"));
        assert!(record.is_empty("title"));
        assert!(record.is_empty("posted_at"));
        assert!(record.is_empty("meta"));
    }

    #[test]
    fn test_materialize_keeps_absent_columns_null() {
        let record = Record::materialize(&schema(), &json!({"title": "A"}));
        assert_eq!(record.get_str("title"), Some("A"));
        assert!(record.is_empty("meta"));
        assert!(record.get("meta").is_some());
    }

    #[test]
    fn test_materialize_ignores_unknown_attributes() {
        let record = Record::materialize(&schema(), &json!({"title": "A", "bogus": 1}));
        assert!(record.get("bogus").is_none());
    }

    #[test]
    fn test_materialize_normalizes_datetime() {
        let record =
            Record::materialize(&schema(), &json!({"posted_at": "2024-01-15T10:30:00+05:00"}));
        assert_eq!(
            record.get_str("posted_at"),
            Some("2024-01-15T05:30:00+00:00")
        );
    }

    #[test]
    fn test_materialize_unparseable_datetime_degrades_to_null() {
        let record = Record::materialize(&schema(), &json!({"posted_at": "last tuesday"}));
        assert!(record.is_empty("posted_at"));
    }

    #[test]
    fn test_materialize_parses_json_text() {
        let record = Record::materialize(&schema(), &json!({"meta": r#"{"tags": ["a"]}"#}));
        assert_eq!(record.get("meta"), Some(&json!({"tags": ["a"]})));
    }

    #[test]
    fn test_materialize_malformed_json_degrades_to_null() {
        let record = Record::materialize(&schema(), &json!({"meta": "{not json"}));
        assert!(record.is_empty("meta"));
    }

    #[test]
    fn test_materialize_json_structure_passes_through() {
        let record = Record::materialize(&schema(), &json!({"meta": {"k": 1}}));
        assert_eq!(record.get("meta"), Some(&json!({"k": 1})));
    }

    #[test]
    fn test_id_excludes_null() {
        let record = Record::materialize(&schema(), &Value::Null);
        assert!(record.id().is_none());

        let record = Record::materialize(&schema(), &json!({"id": 7}));
        assert_eq!(record.id(), Some(&json!(7)));
    }

    #[test]
    fn test_record_serializes_transparently() {
        let record = Record::materialize(&schema(), &json!({"id": 1, "title": "A"}));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value.get("title"), Some(&json!("A")));
    }
}
