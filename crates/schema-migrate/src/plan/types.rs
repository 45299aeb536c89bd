//! Migration plan type definitions.
//!
//! A [`MigrationPlan`] is created once by the planner, optionally replaced by
//! a refined plan, and then consumed read-only by the synthesizers, the runner
//! and the validator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identifier::same_object;

/// The work product of a migration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlan {
    #[serde(default)]
    pub table_mappings: Vec<TableMapping>,

    #[serde(default)]
    pub view_mappings: Vec<ViewMapping>,

    #[serde(default)]
    pub procedure_mappings: Vec<ProcedureMapping>,

    #[serde(default)]
    pub trigger_mappings: Vec<TriggerMapping>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Set when the plan was refined after creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// SQL injected verbatim before the generated body.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_migration_scripts: Vec<String>,

    /// SQL injected verbatim after the generated body.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_migration_scripts: Vec<String>,
}

impl Default for MigrationPlan {
    fn default() -> Self {
        Self {
            table_mappings: Vec::new(),
            view_mappings: Vec::new(),
            procedure_mappings: Vec::new(),
            trigger_mappings: Vec::new(),
            created_at: Utc::now(),
            modified_at: None,
            notes: None,
            pre_migration_scripts: Vec::new(),
            post_migration_scripts: Vec::new(),
        }
    }
}

impl MigrationPlan {
    /// Table mappings that take part in generation.
    pub fn active_tables(&self) -> impl Iterator<Item = &TableMapping> {
        self.table_mappings.iter().filter(|m| !m.skip)
    }

    /// Find the non-skipped mapping for a source table.
    pub fn find_active_table(&self, source_table: &str) -> Option<&TableMapping> {
        self.active_tables()
            .find(|m| same_object(&m.source_table, source_table))
    }

    /// Find a mapping for a source table, skipped or not.
    pub fn find_table(&self, source_table: &str) -> Option<&TableMapping> {
        self.table_mappings
            .iter()
            .find(|m| same_object(&m.source_table, source_table))
    }
}

/// Mapping of one source table onto one target table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMapping {
    /// Qualified source table name.
    pub source_table: String,

    /// Qualified target table name.
    pub target_table: String,

    #[serde(default)]
    pub column_mappings: Vec<ColumnMapping>,

    /// Exclude the table from every generation step.
    #[serde(default)]
    pub skip: bool,

    /// Raw SQL `WHERE` fragment applied when copying data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_condition: Option<String>,
}

impl TableMapping {
    /// Target column name for a source column; `None` when unmapped.
    pub fn target_column(&self, source_column: &str) -> Option<&str> {
        self.column_mappings
            .iter()
            .find(|c| c.source_column.eq_ignore_ascii_case(source_column))
            .map(|c| c.target_column.as_str())
    }

    /// Target column name for a source column, falling back to the source name.
    pub fn target_column_or_same<'a>(&'a self, source_column: &'a str) -> &'a str {
        self.target_column(source_column).unwrap_or(source_column)
    }
}

/// Mapping of one source column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub source_column: String,

    pub target_column: String,

    /// Read-side SQL expression replacing the bare source column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,
}

impl ColumnMapping {
    /// Map a column onto the same name with no transformation.
    pub fn identity(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source_column: name.clone(),
            target_column: name,
            transformation: None,
        }
    }
}

/// Mapping of a view, procedure or trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMapping {
    /// Qualified source object name.
    pub source_name: String,

    /// Qualified target object name.
    pub target_name: String,

    /// Replacement definition emitted verbatim when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewritten_definition: Option<String>,

    #[serde(default)]
    pub skip: bool,
}

impl ObjectMapping {
    pub fn new(source_name: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            target_name: target_name.into(),
            rewritten_definition: None,
            skip: false,
        }
    }
}

pub type ViewMapping = ObjectMapping;
pub type ProcedureMapping = ObjectMapping;
pub type TriggerMapping = ObjectMapping;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_json_field_names() {
        let plan = MigrationPlan {
            table_mappings: vec![TableMapping {
                source_table: "dbo.Orders".to_string(),
                target_table: "orders".to_string(),
                column_mappings: vec![ColumnMapping::identity("id")],
                skip: false,
                filter_condition: Some("id > 10".to_string()),
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["tableMappings"][0]["sourceTable"], "dbo.Orders");
        assert_eq!(json["tableMappings"][0]["filterCondition"], "id > 10");
        assert_eq!(json["tableMappings"][0]["columnMappings"][0]["targetColumn"], "id");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("modifiedAt").is_none());
    }

    #[test]
    fn test_plan_minimal_json() {
        let plan: MigrationPlan = serde_json::from_str(
            r#"{"tableMappings": [{"sourceTable": "a", "targetTable": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(plan.table_mappings.len(), 1);
        assert!(!plan.table_mappings[0].skip);
        assert!(plan.view_mappings.is_empty());
    }

    #[test]
    fn test_find_active_table_ignores_skipped() {
        let mut plan = MigrationPlan::default();
        plan.table_mappings.push(TableMapping {
            source_table: "dbo.Audit".to_string(),
            target_table: "audit".to_string(),
            column_mappings: vec![],
            skip: true,
            filter_condition: None,
        });
        assert!(plan.find_active_table("dbo.audit").is_none());
        assert!(plan.find_table("dbo.audit").is_some());
    }

    #[test]
    fn test_target_column_lookup() {
        let mapping = TableMapping {
            source_table: "Orders".to_string(),
            target_table: "orders".to_string(),
            column_mappings: vec![ColumnMapping {
                source_column: "OrderID".to_string(),
                target_column: "order_id".to_string(),
                transformation: None,
            }],
            skip: false,
            filter_condition: None,
        };
        assert_eq!(mapping.target_column("orderid"), Some("order_id"));
        assert_eq!(mapping.target_column("Total"), None);
        assert_eq!(mapping.target_column_or_same("Total"), "Total");
    }
}
