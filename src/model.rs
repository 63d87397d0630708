//! Model façade and lifecycle engine
//!
//! A `Model` owns the schema, validation registry, accessible-field set,
//! hook registry, and adapter reference for one entity type, and drives
//! every operation through a fixed, ordered stage sequence. Any stage
//! failure short-circuits the stages after it; hook and adapter errors
//! flow through untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::adapter::Adapter;
use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::hooks::{HookEvent, HookFuture, HookPayload, Hooks};
use crate::query::{Query, QueryBuilder};
use crate::record::Record;
use crate::schema::{Table, tableize};
use crate::types::{ColumnDefinition, ColumnType};
use crate::validate::{ColumnRules, ColumnValidation, ValidationError, ValidationMode};

/// Schema-bound façade exposing the lifecycle operations for one entity
/// type
///
/// Constructed once at application start; `init` finalizes it by binding
/// the adapter and deriving default type validations, after which
/// operations become legal. Validation and hook registries are expected
/// to be fully populated before the first operation runs; `Model`
/// operations take `&self` and never lock.
pub struct Model {
    name: String,
    table_name: String,
    config: ModelConfig,
    schema: Table,
    validations: HashMap<String, ColumnValidation>,
    accessible: HashSet<String>,
    hooks: Hooks,
    adapter: Option<Arc<dyn Adapter>>,
}

impl Model {
    /// Define a model from a name and its ordered column definitions
    ///
    /// The table name is the pluralized, underscored model name unless
    /// the config overrides it. Auto-managed columns from the config are
    /// folded into the schema: `id` first, timestamps last.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<ColumnDefinition>,
        config: ModelConfig,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::MissingName);
        }

        let table_name = config
            .table_name
            .clone()
            .unwrap_or_else(|| tableize(&name));

        let mut definitions = Vec::with_capacity(columns.len() + 3);
        if config.auto_columns.id {
            definitions.push(ColumnDefinition::new("id", ColumnType::Integer));
        }
        definitions.extend(columns);
        if config.auto_columns.created_at {
            definitions.push(ColumnDefinition::new("created_at", ColumnType::Datetime));
        }
        if config.auto_columns.updated_at {
            definitions.push(ColumnDefinition::new("updated_at", ColumnType::Datetime));
        }

        let schema = Table::new(table_name.as_str(), definitions);

        Ok(Self {
            name,
            table_name,
            config,
            schema,
            validations: HashMap::new(),
            accessible: HashSet::new(),
            hooks: Hooks::new(),
            adapter: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn schema(&self) -> &Table {
        &self.schema
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Mark columns as permitted in mass-assignment updates
    pub fn accessible<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accessible
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Fluent rule registration for a column
    pub fn validates(&mut self, column: impl Into<String>) -> ColumnRules<'_> {
        ColumnRules::new(self.validations.entry(column.into()).or_default())
    }

    /// Register a lifecycle hook; handlers run in registration order
    pub fn on<F>(&mut self, event: HookEvent, handler: F) -> &mut Self
    where
        F: Fn(HookPayload) -> HookFuture + Send + Sync + 'static,
    {
        self.hooks.on(event, handler);
        self
    }

    /// Finalize the model: bind the adapter, derive default validations,
    /// and run the `init` hook chain
    ///
    /// Every column gets a validation rule named after its declared type;
    /// non-nullable columns additionally get `required`. Explicitly
    /// registered rules with the same name win over derived ones.
    pub async fn init(&mut self, adapter: Arc<dyn Adapter>) -> Result<()> {
        debug!(model = %self.name, table = %self.table_name, "init");

        let derived: Vec<(String, ColumnType, bool)> = self
            .schema
            .iter()
            .map(|c| (c.name.clone(), c.column_type.clone(), c.nullable))
            .collect();

        for (column, column_type, nullable) in derived {
            let already = self
                .validations
                .get(&column)
                .is_some_and(|v| v.contains(column_type.name()));
            if !already {
                self.validates(column.as_str()).of_type(column_type);
            }
            if !nullable && column != "id" {
                self.validates(column.as_str()).required();
            }
        }

        self.adapter = Some(adapter);

        self.hooks.run(HookEvent::Init, HookPayload::Empty).await?;
        Ok(())
    }

    fn adapter(&self) -> Result<&Arc<dyn Adapter>> {
        self.adapter
            .as_ref()
            .ok_or_else(|| ModelError::NotInitialized(self.name.clone()))
    }

    /// Materialize a schema-shaped record from raw attributes
    ///
    /// Pass `Value::Null` (or any non-object) for an all-null record.
    pub fn build(&self, attributes: &Value) -> Record {
        Record::materialize(&self.schema, attributes)
    }

    /// Evaluate every registered rule against a candidate record
    ///
    /// Columns are visited in reverse declaration order. An empty column
    /// value skips its rules unless `required` is registered and the mode
    /// is not `Update`. Returns `None` when no rule failed.
    pub fn validate(
        &self,
        record: &Record,
        mode: ValidationMode,
    ) -> Option<Vec<ValidationError>> {
        let mut errors: Option<Vec<ValidationError>> = None;

        for key in self.schema.keys().iter().rev() {
            let Some(validation) = self.validations.get(key) else {
                continue;
            };

            let value = record.get(key).cloned().unwrap_or(Value::Null);
            if value.is_null()
                && (!validation.contains("required") || mode == ValidationMode::Update)
            {
                continue;
            }

            for rule in validation.iter() {
                if !rule.matches(&value) {
                    errors.get_or_insert_with(Vec::new).push(ValidationError::new(
                        &self.table_name,
                        key,
                        value.clone(),
                        rule,
                    ));
                }
            }
        }

        errors
    }

    /// Shared create/save stage sequence; the two differ only in which
    /// gate and completion hooks they emit
    async fn persist(
        &self,
        mut record: Record,
        gate: HookEvent,
        done: HookEvent,
    ) -> Result<Record> {
        let adapter = self.adapter()?;

        self.schema.coerce(&mut record);

        let payload = self
            .hooks
            .run(HookEvent::BeforeValidate, HookPayload::Record(record))
            .await?;
        let record = payload.try_into_record()?;

        if let Some(errors) = self.validate(&record, ValidationMode::Create) {
            return Err(ModelError::Validation(errors));
        }

        let payload = self
            .hooks
            .run(HookEvent::Validate, HookPayload::Record(record))
            .await?;
        let payload = self.hooks.run(gate, payload).await?;
        let record = payload.try_into_record()?;

        let row = adapter.save(&self.table_name, &record.into_value()).await?;
        let saved = self.build(&row);

        let payload = self.hooks.run(done, HookPayload::Record(saved)).await?;
        payload.try_into_record()
    }

    /// Create a new record from raw attributes
    ///
    /// Stage order: materialize, coerce, `beforeValidate`, rule
    /// validation, `validate`, `beforeCreate`, adapter save, materialize
    /// the stored row, `create`.
    pub async fn create(&self, attributes: Value) -> Result<Record> {
        debug!(table = %self.table_name, "create");
        self.persist(
            self.build(&attributes),
            HookEvent::BeforeCreate,
            HookEvent::Create,
        )
        .await
    }

    /// Persist an already-materialized record
    ///
    /// Same stage order as `create` with the `beforeSave`/`save` hook
    /// names; whether this inserts or upserts is the adapter's concern.
    pub async fn save(&self, record: Record) -> Result<Record> {
        debug!(table = %self.table_name, "save");
        self.persist(record, HookEvent::BeforeSave, HookEvent::Save)
            .await
    }

    /// Update the row with the given identity from raw attributes
    ///
    /// Attributes are first filtered down to the accessible set (fields
    /// not marked accessible are silently dropped), then validated in
    /// update mode, where `required` rules are waived so partial updates
    /// never fail on absent fields.
    pub async fn update(&self, id: impl Into<Value>, attributes: Value) -> Result<Record> {
        let adapter = self.adapter()?;
        let id = id.into();
        debug!(table = %self.table_name, id = %id, "update");

        let filtered = self.schema.filter(&attributes, &self.accessible);
        let record = Record::from_map(filtered);

        let payload = self
            .hooks
            .run(HookEvent::BeforeValidate, HookPayload::Record(record))
            .await?;
        let record = payload.try_into_record()?;

        if let Some(errors) = self.validate(&record, ValidationMode::Update) {
            return Err(ModelError::Validation(errors));
        }

        let payload = self
            .hooks
            .run(HookEvent::Validate, HookPayload::Record(record))
            .await?;
        let payload = self.hooks.run(HookEvent::BeforeUpdate, payload).await?;
        let record = payload.try_into_record()?;

        let row = adapter
            .update(&self.table_name, &id, &record.into_value())
            .await?;
        let updated = self.build(&row);

        let payload = self
            .hooks
            .run(HookEvent::Update, HookPayload::Record(updated))
            .await?;
        payload.try_into_record()
    }

    /// Remove every row matching the query and return the removed records
    ///
    /// `beforeDestroy` hooks see the query before the adapter runs; an
    /// empty `where` filter matches all rows. `destroy` hooks see the
    /// removed collection.
    pub async fn destroy(&self, query: Query) -> Result<Vec<Record>> {
        let adapter = self.adapter()?;
        debug!(table = %self.table_name, match_all = query.matches_all(), "destroy");

        let payload = self
            .hooks
            .run(HookEvent::BeforeDestroy, HookPayload::Query(query))
            .await?;
        let query = payload.try_into_query()?;

        let rows = adapter.destroy(&self.table_name, &query).await?;
        let records: Vec<Record> = rows.iter().map(|row| self.build(row)).collect();

        let payload = self
            .hooks
            .run(HookEvent::Destroy, HookPayload::Records(records))
            .await?;
        payload.try_into_records()
    }

    /// Fetch every row matching the query; no hooks, no validation
    pub async fn find(&self, query: Query) -> Result<Vec<Record>> {
        let adapter = self.adapter()?;
        let rows = adapter.find(&self.table_name, &query).await?;
        Ok(rows.iter().map(|row| self.build(row)).collect())
    }

    /// Fetch the first row matching the query; no hooks, no validation
    pub async fn find_one(&self, query: Query) -> Result<Option<Record>> {
        let adapter = self.adapter()?;
        let row = adapter.find_one(&self.table_name, &query).await?;
        Ok(row.map(|row| self.build(&row)))
    }

    /// Start a deferred query against this model
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("table_name", &self.table_name)
            .field("columns", &self.schema.keys())
            .field("initialized", &self.adapter.is_some())
            .finish()
    }
}
