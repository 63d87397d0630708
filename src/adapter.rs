//! Storage adapter contract
//!
//! Persistence backends implement this fixed contract; the lifecycle
//! engine invokes it and propagates adapter errors untouched. Rows travel
//! as JSON objects so adapters stay schema-agnostic. Atomicity, retries,
//! and identity/timestamp assignment are adapter concerns.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::query::Query;

/// A pluggable persistence backend
///
/// `save` persists a candidate row (insert vs. upsert is the adapter's
/// choice) and returns the stored row, including any adapter-assigned
/// columns such as `id` and timestamps. `update` applies a partial row
/// keyed by id. `find`/`find_one`/`destroy` take a [`Query`] whose empty
/// `where` filter means "match all rows".
#[async_trait]
pub trait Adapter: Send + Sync {
    async fn save(&self, table: &str, record: &Value) -> Result<Value>;

    async fn update(&self, table: &str, id: &Value, record: &Value) -> Result<Value>;

    async fn find(&self, table: &str, query: &Query) -> Result<Vec<Value>>;

    async fn find_one(&self, table: &str, query: &Query) -> Result<Option<Value>>;

    /// Remove matching rows and return them
    async fn destroy(&self, table: &str, query: &Query) -> Result<Vec<Value>>;
}
