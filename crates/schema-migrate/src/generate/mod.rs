//! SQL synthesis from a migration plan.
//!
//! - [`ddl`]: schemas, sequences, tables, provenance comments, indexes, foreign keys
//! - [`defaults`]: column default conversion
//! - [`dml`]: `INSERT ... SELECT` data movement
//! - [`procedural`]: views, stored procedures and triggers
//! - [`script`]: section assembly in execution order
//!
//! Synthesizers return statements without trailing semicolons; [`terminate`]
//! adds them when a section is rendered.

pub mod ddl;
pub mod defaults;
pub mod dml;
pub mod procedural;
pub mod script;

pub use ddl::{generate_foreign_keys, generate_indexes, generate_tables, TablesDdl};
pub use defaults::convert_default_value;
pub use dml::generate_data_migration;
pub use procedural::{
    accept_conversion, convert_procedures, convert_triggers, generate_views,
    manual_conversion_comment, procedure_prompt, trigger_prompt, ObjectKind,
};
pub use script::{render_section, ScriptBuilder};

use std::collections::HashSet;

use crate::core::{Dialect, SchemaAnalysisResult, TableDefinition};
use crate::dialect::TypeMapper;
use crate::plan::{MigrationPlan, TableMapping};

/// Longest synthesized constraint/index name (PostgreSQL's limit).
const MAX_NAME_LENGTH: usize = 63;

/// Everything a synthesizer reads.
#[derive(Clone, Copy)]
pub struct GenerationContext<'a> {
    pub plan: &'a MigrationPlan,
    pub analysis: &'a SchemaAnalysisResult,
    pub target: &'a dyn Dialect,
    pub mapper: &'a TypeMapper,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        plan: &'a MigrationPlan,
        analysis: &'a SchemaAnalysisResult,
        target: &'a dyn Dialect,
        mapper: &'a TypeMapper,
    ) -> Self {
        Self {
            plan,
            analysis,
            target,
            mapper,
        }
    }

    /// Source table definition behind a mapping.
    pub fn source_table(&self, mapping: &TableMapping) -> Option<&'a TableDefinition> {
        self.analysis.find_table(&mapping.source_table)
    }

    /// Check if source and target dialects are the same.
    pub fn same_dialect(&self) -> bool {
        self.mapper.is_identity()
    }
}

/// Tracks synthesized names so duplicates get a numeric suffix.
#[derive(Debug, Default)]
pub struct NameRegistry {
    used: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `base`, or `base_2`, `base_3`, ... if already taken.
    pub fn reserve(&mut self, base: &str) -> String {
        let base = truncate_name(base, MAX_NAME_LENGTH);
        if self.used.insert(base.to_lowercase()) {
            return base;
        }
        let mut n = 2;
        loop {
            let suffix = format!("_{}", n);
            let candidate = format!(
                "{}{}",
                truncate_name(&base, MAX_NAME_LENGTH - suffix.len()),
                suffix
            );
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn truncate_name(name: &str, max: usize) -> String {
    name.chars().take(max).collect()
}

/// Flatten text for use inside a single `--` comment line.
///
/// Control characters (line breaks included) become spaces, so nothing
/// interpolated into a comment can escape onto its own line.
pub fn comment_text(text: &str) -> String {
    text.split(char::is_control)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_comment_line(line: &str) -> bool {
    let line = line.trim_start();
    line.is_empty() || line.starts_with("--")
}

/// Append a semicolon unless the statement is comment-only or already terminated.
///
/// The terminator goes after the last line carrying SQL, ahead of any
/// trailing comment lines. When that line ends in an inline `--` comment the
/// terminator gets a line of its own.
pub fn terminate(statement: &str) -> String {
    let lines: Vec<&str> = statement.trim_end().lines().collect();
    let Some(last) = lines.iter().rposition(|line| !is_comment_line(line)) else {
        return statement.trim_end().to_string();
    };

    let code = lines[..=last].join("\n");
    let code = code.trim_end();
    let last_line = lines[last];
    let before_comment = last_line.split("--").next().unwrap_or(last_line).trim_end();
    let mut out = if code.ends_with(';') || before_comment.ends_with(';') {
        code.to_string()
    } else if before_comment.len() < last_line.trim_end().len() {
        format!("{}\n;", code)
    } else {
        format!("{};", code)
    };

    for trailing in &lines[last + 1..] {
        out.push('\n');
        out.push_str(trailing);
    }
    out
}

/// Terminate and join statements into one block.
pub fn join_statements(statements: &[String]) -> String {
    statements
        .iter()
        .map(|s| terminate(s))
        .collect::<Vec<_>>()
        .join("\n\n")
}
