//! Plan construction from a schema analysis.
//!
//! Every source table becomes a [`TableMapping`] with one identity column
//! mapping per source column. When the type mapper changes the type family
//! representation across dialects, the column mapping carries a read-side
//! `CAST` so the data movement statement produces values of the target type.

use tracing::{debug, info};

use crate::config::DatabaseConnectionConfig;
use crate::core::identifier::qualified_name;
use crate::core::{ColumnDefinition, Dialect, SchemaAnalysisResult, TableDefinition};
use crate::dialect::{classify, split_type, TypeFamily, TypeMapper};
use crate::generate::comment_text;

use super::types::{ColumnMapping, MigrationPlan, ObjectMapping, TableMapping};

/// Build the initial plan for an analysis.
pub fn build_plan(
    analysis: &SchemaAnalysisResult,
    target_config: &DatabaseConnectionConfig,
    target: &dyn Dialect,
    mapper: &TypeMapper,
) -> MigrationPlan {
    let target_schema = target_config
        .schema_name()
        .filter(|s| !target.is_default_schema(s));

    let table_mappings: Vec<TableMapping> = analysis
        .tables
        .iter()
        .map(|table| table_mapping(table, target_schema, target, mapper))
        .collect();

    let same_dialect = mapper.is_identity();
    let view_mappings = analysis
        .views
        .iter()
        .map(|view| {
            let mut mapping = ObjectMapping::new(
                view.full_name(),
                qualified_name(target_schema, &view.name),
            );
            mapping.rewritten_definition = Some(if same_dialect {
                view.definition.clone()
            } else {
                view_placeholder(&view.full_name(), mapper.source_dialect(), target.name())
            });
            mapping
        })
        .collect();

    let procedure_mappings = analysis
        .procedures
        .iter()
        .map(|p| ObjectMapping::new(p.full_name(), qualified_name(target_schema, &p.name)))
        .collect();

    let trigger_mappings = analysis
        .triggers
        .iter()
        .map(|t| ObjectMapping::new(t.full_name(), qualified_name(target_schema, &t.name)))
        .collect();

    let plan = MigrationPlan {
        table_mappings,
        view_mappings,
        procedure_mappings,
        trigger_mappings,
        ..Default::default()
    };

    info!(
        "Created migration plan ({} → {}): {} tables, {} views, {} procedures, {} triggers",
        mapper.source_dialect(),
        target.name(),
        plan.table_mappings.len(),
        plan.view_mappings.len(),
        plan.procedure_mappings.len(),
        plan.trigger_mappings.len()
    );
    plan
}

fn table_mapping(
    table: &TableDefinition,
    target_schema: Option<&str>,
    target: &dyn Dialect,
    mapper: &TypeMapper,
) -> TableMapping {
    let column_mappings = table
        .columns
        .iter()
        .map(|column| ColumnMapping {
            source_column: column.name.clone(),
            target_column: column.name.clone(),
            transformation: read_transformation(column, target, mapper),
        })
        .collect();

    TableMapping {
        source_table: table.full_name(),
        target_table: qualified_name(target_schema, &table.name),
        column_mappings,
        skip: false,
        filter_condition: None,
    }
}

/// Read-side expression converting a column's values to the target type.
///
/// Returns `None` for same-dialect migrations and for columns whose mapped
/// type needs no explicit conversion.
pub fn read_transformation(
    column: &ColumnDefinition,
    target: &dyn Dialect,
    mapper: &TypeMapper,
) -> Option<String> {
    if mapper.is_identity() {
        return None;
    }

    let mapped = mapper.map_type(&column.data_type).target_type;
    if mapped.eq_ignore_ascii_case(column.data_type.trim()) {
        return None;
    }

    let source_family = classify(&column.data_type)?;
    let target_family = classify(&mapped)?;
    if !needs_cast(&column.data_type, source_family, target_family) {
        return None;
    }

    debug!(
        "Column {} ({}) is read as {}",
        column.name, column.data_type, mapped
    );
    Some(format!("CAST({} AS {})", target.ident(&column.name), mapped))
}

/// Seed list of representation changes that are cast on read.
fn needs_cast(source_type: &str, source: TypeFamily, target: TypeFamily) -> bool {
    use TypeFamily::*;

    match (source, target) {
        (Timestamp | TimestampTz, Timestamp | TimestampTz) => true,
        // bit and tinyint(1) encode booleans as numbers.
        (Boolean | TinyInt, Boolean) => true,
        (Uuid, Uuid) => true,
        // Large objects only; sized strings and binaries copy as-is.
        (Text, Text) => true,
        (Binary, Binary) => {
            let (base, _) = split_type(source_type);
            base.contains("blob") || base == "image"
        }
        _ => false,
    }
}

/// Marker stored for views that cannot be carried over automatically.
pub fn view_placeholder(view: &str, source_dialect: &str, target_dialect: &str) -> String {
    format!(
        "-- View {} requires manual conversion from {} to {}",
        comment_text(view),
        source_dialect,
        target_dialect
    )
}
