//! # modelkit
//!
//! A schema-driven model lifecycle runtime with pluggable storage
//! adapters.
//!
//! This crate turns a declarative schema into a data-model abstraction
//! that validates, coerces, persists, and retrieves records through any
//! backend implementing the [`Adapter`] contract. Application code can
//! observe and veto every lifecycle transition through ordered,
//! short-circuiting hook chains.
//!
//! ## Features
//!
//! - **Declarative Schemas**: Ordered, typed column definitions with
//!   auto-managed id and timestamp columns
//! - **Lifecycle Hooks**: `beforeValidate` through `destroy`, run strictly
//!   in registration order; any failure aborts the operation
//! - **Validation Rules**: Fluent per-column constraint registration with
//!   type rules derived automatically at init
//! - **Type Coercion**: Datetime normalization to UTC RFC 3339, JSON text
//!   parsing (degrading to null when malformed), numeric/boolean string
//!   conversion
//! - **Mass-Assignment Protection**: Updates silently drop fields not
//!   marked accessible
//! - **Pluggable Persistence**: A fixed async `save/update/find/find_one/
//!   destroy` adapter contract; adapter errors flow through untouched
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # use async_trait::async_trait;
//! # use serde_json::Value;
//! # use modelkit::{Adapter, Query, Result};
//! # #[derive(Default)]
//! # struct SqliteAdapter;
//! # #[async_trait]
//! # impl Adapter for SqliteAdapter {
//! #     async fn save(&self, _table: &str, record: &Value) -> Result<Value> { Ok(record.clone()) }
//! #     async fn update(&self, _table: &str, _id: &Value, record: &Value) -> Result<Value> { Ok(record.clone()) }
//! #     async fn find(&self, _table: &str, _query: &Query) -> Result<Vec<Value>> { Ok(vec![]) }
//! #     async fn find_one(&self, _table: &str, _query: &Query) -> Result<Option<Value>> { Ok(None) }
//! #     async fn destroy(&self, _table: &str, _query: &Query) -> Result<Vec<Value>> { Ok(vec![]) }
//! # }
//! use std::sync::Arc;
//!
//! use modelkit::{ColumnDefinition, ColumnType, Model, ModelConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     // Define a model; the table name is derived ("items")
//!     let mut item = Model::new(
//!         "Item",
//!         vec![
//!             ColumnDefinition::new("title", ColumnType::String).not_null(),
//!             ColumnDefinition::new("count", ColumnType::Integer),
//!             ColumnDefinition::new("meta", ColumnType::Json),
//!         ],
//!         ModelConfig::default(),
//!     )?;
//!
//!     item.validates("title").max_length(255);
//!     item.accessible(["title", "count", "meta"]);
//!
//!     // Bind the storage backend; type validations derive automatically
//!     item.init(Arc::new(SqliteAdapter::default())).await?;
//!
//!     // Create: coerce -> hooks -> validate -> hooks -> adapter -> hooks
//!     let record = item
//!         .create(serde_json::json!({"title": "Blue Widget", "count": "1"}))
//!         .await?;
//!     assert_eq!(record.get_i64("count"), Some(1));
//!
//!     // Deferred query: construct now, execute later
//!     let widgets = item.query().filter("title", "Blue Widget").find().await?;
//!
//!     // Match-all destroy takes an explicit empty filter
//!     item.destroy(Query::new()).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Hooks
//!
//! Handlers receive the in-flight payload (the candidate record, or the
//! query for `beforeDestroy`) and return it to continue the chain:
//!
//! ```rust
//! use modelkit::{HookEvent, HookFuture, HookPayload, Model};
//! # fn register(model: &mut Model) {
//! model.on(HookEvent::BeforeCreate, |mut payload| -> HookFuture {
//!     Box::pin(async move {
//!         if let Some(record) = payload.record_mut() {
//!             record.set("title", "stamped");
//!         }
//!         Ok(payload)
//!     })
//! });
//! # }
//! ```
//!
//! Returning an error from any handler aborts the remaining handlers and
//! the surrounding operation; the error reaches the caller verbatim.

pub mod adapter;
pub mod config;
pub mod error;
pub mod hooks;
pub mod model;
pub mod query;
pub mod record;
pub mod schema;
pub mod types;
pub mod validate;

// Re-export main types for convenience
pub use adapter::Adapter;
pub use config::{AutoColumns, ModelConfig, ModelConfigBuilder};
pub use error::{ModelError, Result};
pub use hooks::{HookEvent, HookFuture, HookPayload, Hooks};
pub use model::Model;
pub use query::{Query, QueryBuilder};
pub use record::Record;
pub use schema::{Table, tableize};
pub use types::{ColumnDefinition, ColumnType};
pub use validate::{ColumnRules, Rule, ValidationError, ValidationMode};
