//! Configuration for model construction
//!
//! Provides a builder pattern for per-model options.

/// Configuration for auto-managed columns
#[derive(Debug, Clone)]
pub struct AutoColumns {
    /// Whether to include an `id` identity column
    pub id: bool,
    /// Whether to include a `created_at` datetime column
    pub created_at: bool,
    /// Whether to include an `updated_at` datetime column
    pub updated_at: bool,
}

impl Default for AutoColumns {
    fn default() -> Self {
        Self {
            id: true,
            created_at: true,
            updated_at: true,
        }
    }
}

/// Configuration for a model
///
/// The table name defaults to the pluralized, underscored model name
/// unless overridden here. Auto-managed column values (id, timestamps)
/// are assigned by the storage adapter; the config only controls whether
/// the columns exist in the schema.
#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    /// Explicit table name override (default: derived from the model name)
    pub table_name: Option<String>,
    /// Auto-managed columns configuration
    pub auto_columns: AutoColumns,
}

impl ModelConfig {
    /// Create a new configuration builder
    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::new()
    }
}

/// Builder for ModelConfig
#[derive(Debug, Default)]
pub struct ModelConfigBuilder {
    table_name: Option<String>,
    auto_columns: AutoColumns,
}

impl ModelConfigBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the derived table name
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Enable or disable the auto-generated `id` column (default: true)
    pub fn auto_id(mut self, enabled: bool) -> Self {
        self.auto_columns.id = enabled;
        self
    }

    /// Enable or disable the `created_at` column (default: true)
    pub fn auto_created_at(mut self, enabled: bool) -> Self {
        self.auto_columns.created_at = enabled;
        self
    }

    /// Enable or disable the `updated_at` column (default: true)
    pub fn auto_updated_at(mut self, enabled: bool) -> Self {
        self.auto_columns.updated_at = enabled;
        self
    }

    /// Disable the auto-generated `id` column
    pub fn without_id(mut self) -> Self {
        self.auto_columns.id = false;
        self
    }

    /// Disable both timestamp columns
    pub fn without_timestamps(mut self) -> Self {
        self.auto_columns.created_at = false;
        self.auto_columns.updated_at = false;
        self
    }

    /// Disable all auto-managed columns
    pub fn without_auto_columns(mut self) -> Self {
        self.auto_columns = AutoColumns {
            id: false,
            created_at: false,
            updated_at: false,
        };
        self
    }

    /// Build the configuration
    pub fn build(self) -> ModelConfig {
        ModelConfig {
            table_name: self.table_name,
            auto_columns: self.auto_columns,
        }
    }
}
