//! DDL synthesis: schemas, sequences, tables, provenance comments, indexes
//! and foreign keys.

use tracing::{debug, warn};

use crate::core::identifier::{name_fragment, qualified_name, split_qualified};
use crate::core::{ColumnDefinition, TableDefinition};
use crate::dialect::TypeFamily;
use crate::plan::{ColumnMapping, TableMapping};

use super::defaults::{boolean_default, convert_default_value};
use super::{comment_text, GenerationContext, NameRegistry};

/// Statements produced by the table phase, in emission order.
#[derive(Debug, Default, Clone)]
pub struct TablesDdl {
    pub schemas: Vec<String>,
    pub sequences: Vec<String>,
    pub tables: Vec<String>,
    pub comments: Vec<String>,
}

impl TablesDdl {
    /// All statements, in emission order.
    pub fn into_statements(self) -> Vec<String> {
        let mut out = self.schemas;
        out.extend(self.sequences);
        out.extend(self.tables);
        out.extend(self.comments);
        out
    }
}

/// Generate schema, sequence, table and comment DDL for every active table.
pub fn generate_tables(ctx: &GenerationContext<'_>) -> TablesDdl {
    let mut ddl = TablesDdl::default();
    let mut schemas: Vec<String> = Vec::new();

    for mapping in ctx.plan.active_tables() {
        let Some(source) = ctx.source_table(mapping) else {
            warn!(
                "Source table {} not found in schema analysis; no DDL generated",
                mapping.source_table
            );
            ddl.tables.push(format!(
                "-- Table {} not found in the source schema; {} was not created",
                comment_text(&mapping.source_table),
                comment_text(&mapping.target_table)
            ));
            continue;
        };

        let Some(rendered) = render_table(ctx, mapping, source) else {
            warn!(
                "No column of {} resolves against the source; no DDL generated",
                mapping.source_table
            );
            ddl.tables.push(format!(
                "-- Table {} has no resolvable column mappings; {} was not created",
                comment_text(&mapping.source_table),
                comment_text(&mapping.target_table)
            ));
            continue;
        };

        if let (Some(schema), _) = split_qualified(&mapping.target_table) {
            if !ctx.target.is_default_schema(schema)
                && !schemas.iter().any(|s| s.eq_ignore_ascii_case(schema))
            {
                schemas.push(schema.to_string());
            }
        }

        ddl.sequences.extend(rendered.sequences);
        ddl.tables.push(rendered.create);
        ddl.comments.extend(rendered.comments);
    }

    ddl.schemas = schemas.iter().map(|s| ctx.target.create_schema(s)).collect();
    ddl
}

/// Check whether at least one column mapping names a real source column.
fn has_resolvable_columns(mapping: &TableMapping, source: &TableDefinition) -> bool {
    mapping
        .column_mappings
        .iter()
        .any(|c| source.column(&c.source_column).is_some())
}

struct RenderedTable {
    sequences: Vec<String>,
    create: String,
    comments: Vec<String>,
}

fn render_table(
    ctx: &GenerationContext<'_>,
    mapping: &TableMapping,
    source: &TableDefinition,
) -> Option<RenderedTable> {
    let target = ctx.target;
    let mut warnings: Vec<String> = Vec::new();
    let mut sequences = Vec::new();
    let mut lines = Vec::new();
    let mut comments = vec![target.comment_on_table(
        &mapping.target_table,
        &format!("Migrated from {}", mapping.source_table),
    )];

    for column_mapping in &mapping.column_mappings {
        // Unresolvable mappings are dropped silently.
        let Some(column) = source.column(&column_mapping.source_column) else {
            debug!(
                "Column {}.{} not found in source; omitted",
                mapping.source_table, column_mapping.source_column
            );
            continue;
        };

        let line = render_column(ctx, mapping, column_mapping, column, &mut sequences, &mut warnings);
        lines.push(format!("    {}", line));
        comments.push(target.comment_on_column(
            &mapping.target_table,
            &column_mapping.target_column,
            &format!("Migrated from {}.{}", mapping.source_table, column.name),
        ));
    }

    if lines.is_empty() {
        return None;
    }

    let pk: Vec<String> = source
        .primary_key
        .iter()
        .flatten()
        .filter_map(|c| mapping.target_column(c))
        .map(|c| target.ident(c))
        .collect();
    if !pk.is_empty() {
        lines.push(format!("    PRIMARY KEY ({})", pk.join(", ")));
    }

    let mut create = String::new();
    for warning in &warnings {
        create.push_str(&format!("-- WARNING: {}\n", comment_text(warning)));
    }
    create.push_str(&format!(
        "CREATE TABLE {} (\n{}\n)",
        target.qualify(&mapping.target_table),
        lines.join(",\n")
    ));

    Some(RenderedTable {
        sequences,
        create,
        comments,
    })
}

fn render_column(
    ctx: &GenerationContext<'_>,
    mapping: &TableMapping,
    column_mapping: &ColumnMapping,
    column: &ColumnDefinition,
    sequences: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> String {
    let target = ctx.target;
    let mapped = ctx.mapper.map_type(&column.data_type);
    if let Some(warning) = &mapped.warning {
        warn!("{}.{}: {}", mapping.source_table, column.name, warning);
        warnings.push(format!("{}: {}", column_mapping.target_column, warning));
    }

    let family = ctx.mapper.target_family(&column.data_type);
    let mut line = format!(
        "{} {}",
        target.ident(&column_mapping.target_column),
        mapped.target_type
    );

    let integer_identity = column.is_identity && family.is_some_and(TypeFamily::is_integer);
    if integer_identity {
        line.push(' ');
        line.push_str(target.identity_clause());
    }
    if !column.is_nullable {
        line.push_str(" NOT NULL");
    }

    if column.is_identity && !integer_identity {
        let (schema, table) = split_qualified(&mapping.target_table);
        let sequence = qualified_name(
            schema,
            &format!(
                "{}_{}_seq",
                name_fragment(table),
                name_fragment(&column_mapping.target_column)
            ),
        );
        match (target.create_sequence(&sequence), target.sequence_default(&sequence)) {
            (Some(create), Some(default)) => {
                sequences.push(create);
                line.push_str(&format!(" DEFAULT {}", default));
            }
            _ => {
                let warning = format!(
                    "{} has no sequences; identity column of type {} gets no generated default",
                    target.name(),
                    mapped.target_type
                );
                warn!("{}.{}: {}", mapping.source_table, column.name, warning);
                warnings.push(format!("{}: {}", column_mapping.target_column, warning));
            }
        }
    } else if let Some(raw) = column.default_value.as_deref().filter(|_| !column.is_identity) {
        let mut default = convert_default_value(raw, target);
        if family == Some(TypeFamily::Boolean) {
            if let Some(literal) = boolean_default(&default, target) {
                default = literal.to_string();
            }
        }
        line.push_str(&format!(" DEFAULT {}", default));
    }

    line
}

/// Generate index DDL for every active table.
pub fn generate_indexes(ctx: &GenerationContext<'_>) -> Vec<String> {
    let mut names = NameRegistry::new();
    let mut out = Vec::new();

    for mapping in ctx.plan.active_tables() {
        let Some(source) = ctx
            .source_table(mapping)
            .filter(|t| has_resolvable_columns(mapping, t))
        else {
            continue;
        };
        let (_, table) = split_qualified(&mapping.target_table);

        for index in &source.indexes {
            let columns: Vec<String> = index
                .columns
                .iter()
                .map(|c| mapping.target_column_or_same(c).to_string())
                .collect();
            let base = std::iter::once(format!("idx_{}", name_fragment(table)))
                .chain(columns.iter().map(|c| name_fragment(c)))
                .collect::<Vec<_>>()
                .join("_");
            let name = names.reserve(&base);

            // btree is every engine's default.
            let index_type = index
                .index_type
                .as_deref()
                .filter(|t| !t.eq_ignore_ascii_case("btree"));
            out.push(ctx.target.create_index(
                &name,
                &mapping.target_table,
                &columns,
                index.is_unique,
                index_type,
            ));
        }
    }
    out
}

/// Generate foreign key DDL for every active table.
///
/// Foreign keys referencing a table this plan does not create (skipped,
/// unmapped, or left without columns) are replaced with an explanatory comment.
pub fn generate_foreign_keys(ctx: &GenerationContext<'_>) -> Vec<String> {
    let target = ctx.target;
    let mut names = NameRegistry::new();
    let mut out = Vec::new();

    for mapping in ctx.plan.active_tables() {
        let Some(source) = ctx
            .source_table(mapping)
            .filter(|t| has_resolvable_columns(mapping, t))
        else {
            continue;
        };

        for fk in &source.foreign_keys {
            let referenced = fk.referenced_full_name();
            let created = ctx
                .plan
                .find_active_table(&referenced)
                .filter(|m| ctx.source_table(m).is_some_and(|t| has_resolvable_columns(m, t)));
            let Some(ref_mapping) = created else {
                let label = fk.name.clone().unwrap_or_else(|| fk.columns.join(", "));
                warn!(
                    "Foreign key {} on {} omitted: {} is not migrated",
                    label, mapping.source_table, referenced
                );
                out.push(format!(
                    "-- Foreign key {} on {} omitted: referenced table {} is not created by this plan",
                    comment_text(&label),
                    comment_text(&mapping.target_table),
                    comment_text(&referenced)
                ));
                continue;
            };

            let columns: Vec<String> = fk
                .columns
                .iter()
                .map(|c| target.ident(mapping.target_column_or_same(c)))
                .collect();
            let ref_columns: Vec<String> = fk
                .referenced_columns
                .iter()
                .map(|c| target.ident(ref_mapping.target_column_or_same(c)))
                .collect();

            let (_, table) = split_qualified(&mapping.target_table);
            let (_, ref_table) = split_qualified(&ref_mapping.target_table);
            let name = names.reserve(&format!(
                "fk_{}_{}",
                name_fragment(table),
                name_fragment(ref_table)
            ));

            let mut sql = format!(
                "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
                target.qualify(&mapping.target_table),
                target.ident(&name),
                columns.join(", "),
                target.qualify(&ref_mapping.target_table),
                ref_columns.join(", ")
            );
            if let Some(action) = fk.on_delete.as_deref() {
                sql.push_str(&format!(" ON DELETE {}", map_referential_action(action)));
            }
            if let Some(action) = fk.on_update.as_deref() {
                sql.push_str(&format!(" ON UPDATE {}", map_referential_action(action)));
            }
            out.push(sql);
        }
    }
    out
}

/// Normalize a source referential action.
fn map_referential_action(action: &str) -> &'static str {
    match action.trim().to_uppercase().replace(' ', "_").as_str() {
        "CASCADE" => "CASCADE",
        "SET_NULL" => "SET NULL",
        "SET_DEFAULT" => "SET DEFAULT",
        "RESTRICT" => "RESTRICT",
        _ => "NO ACTION",
    }
}
