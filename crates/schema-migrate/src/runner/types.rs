//! Execution and validation result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options passed through to the runner untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOptions {
    /// Rows per batch during data movement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,

    /// Truncate target tables before loading.
    #[serde(default)]
    pub truncate_target: bool,

    /// Run validation after execution.
    #[serde(default)]
    pub validate_after: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            batch_size: None,
            truncate_target: false,
            validate_after: true,
        }
    }
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    /// True when every table succeeded and no run-level failure occurred.
    pub success: bool,

    /// When the migration started.
    pub start_time: DateTime<Utc>,

    /// When the migration completed.
    pub end_time: DateTime<Utc>,

    #[serde(default)]
    pub tables: Vec<TableResult>,

    /// Total rows processed across all tables.
    pub total_rows_processed: u64,

    #[serde(default)]
    pub warnings: Vec<String>,

    #[serde(default)]
    pub log: Vec<String>,
}

impl MigrationResult {
    /// Build a result from per-table outcomes.
    pub fn from_tables(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        tables: Vec<TableResult>,
    ) -> Self {
        let total_rows_processed = tables.iter().map(|t| t.rows_processed).sum();
        let warnings = tables
            .iter()
            .filter(|t| !t.success)
            .map(|t| format!("Table {} failed", t.table_name))
            .collect();
        Self {
            success: tables.iter().all(|t| t.success),
            start_time,
            end_time,
            tables,
            total_rows_processed,
            warnings,
            log: Vec::new(),
        }
    }

    /// A failed result with no table outcomes.
    pub fn failed(warning: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            success: false,
            start_time: now,
            end_time: now,
            tables: Vec::new(),
            total_rows_processed: 0,
            warnings: vec![warning.into()],
            log: Vec::new(),
        }
    }

    /// Names of tables that failed.
    pub fn failed_tables(&self) -> Vec<&str> {
        self.tables
            .iter()
            .filter(|t| !t.success)
            .map(|t| t.table_name.as_str())
            .collect()
    }

    /// Total duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }

    /// Convert result to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Outcome for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResult {
    pub table_name: String,
    pub rows_processed: u64,
    pub success: bool,
}

/// Result of post-migration validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub success: bool,

    #[serde(default)]
    pub tables: Vec<TableValidation>,

    /// All issues, table-level ones prefixed with the table name.
    #[serde(default)]
    pub issues: Vec<String>,

    /// Human-readable report.
    pub report: String,
}

impl ValidationResult {
    /// Build a result from per-table validations.
    pub fn from_tables(tables: Vec<TableValidation>) -> Self {
        let issues: Vec<String> = tables
            .iter()
            .flat_map(|t| {
                t.issues
                    .iter()
                    .map(move |issue| format!("{}: {}", t.table_name, issue))
            })
            .collect();
        let success = tables.iter().all(TableValidation::passed);

        let mut report = format!(
            "Validated {} table(s): {} passed, {} failed",
            tables.len(),
            tables.iter().filter(|t| t.passed()).count(),
            tables.iter().filter(|t| !t.passed()).count()
        );
        for t in &tables {
            report.push_str(&format!(
                "\n  {} {}: source={} target={}",
                if t.passed() { "OK  " } else { "FAIL" },
                t.table_name,
                t.source_row_count,
                t.target_row_count
            ));
        }

        Self {
            success,
            tables,
            issues,
            report,
        }
    }

    /// A failed result with no table validations.
    pub fn failed(issue: impl Into<String>) -> Self {
        let issue = issue.into();
        Self {
            success: false,
            tables: Vec::new(),
            report: format!("Validation failed: {}", issue),
            issues: vec![issue],
        }
    }
}

/// Validation outcome for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableValidation {
    pub table_name: String,
    pub source_row_count: u64,
    pub target_row_count: u64,
    pub count_match: bool,

    /// Whether sampled rows matched; `None` when no sampling was done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_samples_match: Option<bool>,

    #[serde(default)]
    pub issues: Vec<String>,
}

impl TableValidation {
    /// Compare row counts for a table.
    pub fn compare(table_name: impl Into<String>, source_row_count: u64, target_row_count: u64) -> Self {
        let count_match = source_row_count == target_row_count;
        let issues = if count_match {
            Vec::new()
        } else {
            vec![format!(
                "Row count mismatch: source={}, target={}",
                source_row_count, target_row_count
            )]
        };
        Self {
            table_name: table_name.into(),
            source_row_count,
            target_row_count,
            count_match,
            data_samples_match: None,
            issues,
        }
    }

    /// Record a sampling outcome.
    pub fn with_samples(mut self, matched: bool) -> Self {
        self.data_samples_match = Some(matched);
        if !matched {
            self.issues.push("Sampled rows differ".to_string());
        }
        self
    }

    pub fn passed(&self) -> bool {
        self.count_match && self.data_samples_match != Some(false) && self.issues.is_empty()
    }
}
