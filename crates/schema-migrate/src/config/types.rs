//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database the schema analysis was taken from.
    pub source: DatabaseConnectionConfig,

    /// Target database the migration is generated for.
    pub target: DatabaseConnectionConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,

    /// Text generator backend. Without one, every generative step falls back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorConfig>,
}

/// Connection settings for one side of a migration.
///
/// The engine itself only reads `type` and `schema`; the connection fields are
/// passed through untouched to the migration runner.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConnectionConfig {
    /// Dialect tag (e.g., "postgres", "mssql", "mysql").
    pub r#type: String,

    /// Database host.
    #[serde(default)]
    pub host: String,

    /// Database port (dialect default when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    #[serde(default)]
    pub database: String,

    /// Username.
    #[serde(default)]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Schema new objects are created in (dialect default when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl fmt::Debug for DatabaseConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConnectionConfig")
            .field("type", &self.r#type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .finish()
    }
}

impl DatabaseConnectionConfig {
    /// Create a config carrying only a dialect tag.
    pub fn new(db_type: impl Into<String>) -> Self {
        Self {
            r#type: db_type.into(),
            ..Default::default()
        }
    }

    /// Set the schema new objects are created in.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Configured schema, ignoring blank values.
    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Emit index DDL (default: true).
    #[serde(default = "default_true")]
    pub create_indexes: bool,

    /// Emit foreign key DDL (default: true).
    #[serde(default = "default_true")]
    pub create_foreign_keys: bool,

    /// Emit table and column provenance comments (default: true).
    #[serde(default = "default_true")]
    pub add_comments: bool,

    /// Emit data migration DML (default: true).
    #[serde(default = "default_true")]
    pub include_data: bool,

    /// Free-text instructions used to refine generated plans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            create_indexes: true,
            create_foreign_keys: true,
            add_comments: true,
            include_data: true,
            custom_instructions: None,
        }
    }
}

/// External command used as the text generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Program and arguments; the prompt is written to stdin.
    pub command: Vec<String>,

    /// Per-call timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_true() -> bool {
    true
}
