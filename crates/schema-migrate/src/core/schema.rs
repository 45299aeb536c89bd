//! Source schema description consumed by the planner and synthesizers.
//!
//! A [`SchemaAnalysisResult`] is produced by an external introspection step and
//! is treated as read-only input. Columns, indexes and foreign keys reference
//! each other by name, never by object identity.

use serde::{Deserialize, Serialize};

use super::identifier::{qualified_name, same_object};

/// Structural description of a source database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaAnalysisResult {
    /// Source dialect tag (e.g., "mssql", "mysql").
    pub database_type: String,

    /// Tables in source order.
    #[serde(default)]
    pub tables: Vec<TableDefinition>,

    #[serde(default)]
    pub views: Vec<ViewDefinition>,

    #[serde(default)]
    pub procedures: Vec<ProcedureDefinition>,

    #[serde(default)]
    pub triggers: Vec<TriggerDefinition>,
}

impl SchemaAnalysisResult {
    /// Find a table by qualified name.
    pub fn find_table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| same_object(&t.full_name(), name))
    }

    /// Find a view by qualified name.
    pub fn find_view(&self, name: &str) -> Option<&ViewDefinition> {
        self.views.iter().find(|v| same_object(&v.full_name(), name))
    }

    /// Find a stored procedure by qualified name.
    pub fn find_procedure(&self, name: &str) -> Option<&ProcedureDefinition> {
        self.procedures
            .iter()
            .find(|p| same_object(&p.full_name(), name))
    }

    /// Find a trigger by qualified name.
    pub fn find_trigger(&self, name: &str) -> Option<&TriggerDefinition> {
        self.triggers.iter().find(|t| same_object(&t.full_name(), name))
    }
}

/// Table metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    /// Table name.
    pub name: String,

    /// Schema name, if the source has schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Column definitions in ordinal order.
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,

    /// Primary key column names, in key order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<String>>,

    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,

    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDefinition>,
}

impl TableDefinition {
    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        qualified_name(self.schema.as_deref(), &self.name)
    }

    /// Look up a column by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Check if the table has a primary key.
    pub fn has_pk(&self) -> bool {
        self.primary_key.as_ref().is_some_and(|pk| !pk.is_empty())
    }
}

/// Column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,

    /// Source data type as reported by the source (e.g., "nvarchar(50)").
    pub data_type: String,

    /// Whether the column allows NULL.
    #[serde(default = "default_true")]
    pub is_nullable: bool,

    /// Raw default expression as reported by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Whether the column is an identity column.
    #[serde(default)]
    pub is_identity: bool,
}

/// Index metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    /// Index name in the source.
    pub name: String,

    /// Indexed column names.
    pub columns: Vec<String>,

    #[serde(default)]
    pub is_unique: bool,

    /// Access method (e.g., "btree", "gin", "clustered").
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,
}

/// Foreign key metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDefinition {
    /// Constraint name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Local column names.
    pub columns: Vec<String>,

    /// Referenced table name.
    pub referenced_table: String,

    /// Referenced schema name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_schema: Option<String>,

    /// Referenced column names.
    pub referenced_columns: Vec<String>,

    /// ON DELETE action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,

    /// ON UPDATE action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
}

impl ForeignKeyDefinition {
    /// Qualified name of the referenced table.
    pub fn referenced_full_name(&self) -> String {
        qualified_name(self.referenced_schema.as_deref(), &self.referenced_table)
    }
}

/// View metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Full `CREATE VIEW` text in the source dialect.
    pub definition: String,
}

impl ViewDefinition {
    pub fn full_name(&self) -> String {
        qualified_name(self.schema.as_deref(), &self.name)
    }
}

/// Stored procedure metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureDefinition {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub parameters: Vec<ProcedureParameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,

    /// Full procedure text in the source dialect.
    pub definition: String,
}

impl ProcedureDefinition {
    pub fn full_name(&self) -> String {
        qualified_name(self.schema.as_deref(), &self.name)
    }
}

/// A single procedure parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureParameter {
    pub name: String,
    pub data_type: String,

    /// IN, OUT or INOUT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// Trigger metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDefinition {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Table the trigger is attached to.
    pub table: String,

    /// Firing events (INSERT, UPDATE, DELETE).
    #[serde(default)]
    pub events: Vec<String>,

    /// BEFORE, AFTER or INSTEAD OF.
    #[serde(default = "default_timing")]
    pub timing: String,

    /// Row-level (true) or statement-level (false).
    #[serde(default)]
    pub for_each_row: bool,

    /// Full trigger text in the source dialect.
    pub definition: String,
}

impl TriggerDefinition {
    pub fn full_name(&self) -> String {
        qualified_name(self.schema.as_deref(), &self.name)
    }
}

fn default_true() -> bool {
    true
}

fn default_timing() -> String {
    "AFTER".to_string()
}
