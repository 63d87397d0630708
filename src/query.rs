//! Query values and the deferred query builder
//!
//! A [`Query`] is the filter object adapters consume; an empty `where`
//! map matches all rows. [`QueryBuilder`] is the deferred form: it
//! captures the model and query now and executes `find`/`find_one`/
//! `destroy` later with identical semantics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::model::Model;
use crate::record::Record;

/// Filter carried by find/find_one/destroy operations
///
/// `filter` is an equality map over column values; empty means "match
/// all rows". Limit, offset, and ordering are optional hints adapters
/// may honor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Column equality filters; empty matches every row
    #[serde(
        rename = "where",
        default,
        skip_serializing_if = "Map::is_empty"
    )]
    pub filter: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,

    /// Columns to order by, in priority order
    #[serde(rename = "order", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<String>,
}

impl Query {
    /// An explicit match-all query
    pub fn new() -> Self {
        Self::default()
    }

    /// A query matching the row with the given identity value
    pub fn by_id(id: impl Into<Value>) -> Self {
        Self::new().filter("id", id)
    }

    /// Add an equality filter
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(column.into(), value.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(column.into());
        self
    }

    /// Whether this query matches every row
    pub fn matches_all(&self) -> bool {
        self.filter.is_empty()
    }
}

/// Deferred query: construct now, execute later
///
/// Returned by [`Model::query`]; the terminal operations run with the
/// same semantics as calling the model directly.
#[derive(Debug)]
pub struct QueryBuilder<'m> {
    model: &'m Model,
    query: Query,
}

impl<'m> QueryBuilder<'m> {
    pub(crate) fn new(model: &'m Model) -> Self {
        Self {
            model,
            query: Query::new(),
        }
    }

    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query = self.query.filter(column, value);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.query = self.query.offset(offset);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.query = self.query.order_by(column);
        self
    }

    /// The query built so far
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub async fn find(self) -> Result<Vec<Record>> {
        self.model.find(self.query).await
    }

    pub async fn find_one(self) -> Result<Option<Record>> {
        self.model.find_one(self.query).await
    }

    pub async fn destroy(self) -> Result<Vec<Record>> {
        self.model.destroy(self.query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_matches_all() {
        let query = Query::new();
        assert!(query.matches_all());
        assert!(query.limit.is_none());
    }

    #[test]
    fn test_filter_chaining() {
        let query = Query::new()
            .filter("title", "A")
            .filter("count", 3)
            .limit(10)
            .offset(5)
            .order_by("created_at");

        assert!(!query.matches_all());
        assert_eq!(query.filter.get("title"), Some(&json!("A")));
        assert_eq!(query.filter.get("count"), Some(&json!(3)));
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.offset, Some(5));
        assert_eq!(query.order_by, ["created_at"]);
    }

    #[test]
    fn test_by_id() {
        let query = Query::by_id(5);
        assert_eq!(query.filter.get("id"), Some(&json!(5)));
    }

    #[test]
    fn test_serialization_uses_where() {
        let query = Query::new().filter("id", 5);
        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"where\""));
        assert!(!json.contains("limit"));
    }

    #[test]
    fn test_deserialization_defaults() {
        let query: Query = serde_json::from_str("{}").unwrap();
        assert!(query.matches_all());

        let query: Query = serde_json::from_str(r#"{"where":{"id":5},"limit":1}"#).unwrap();
        assert_eq!(query.filter.get("id"), Some(&json!(5)));
        assert_eq!(query.limit, Some(1));
    }
}
