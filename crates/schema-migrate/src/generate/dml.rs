//! Data movement statements.

use super::{comment_text, GenerationContext};

/// Generate one `INSERT ... SELECT` per active table mapping.
///
/// Transformations and filter conditions are raw SQL and are emitted as-is.
pub fn generate_data_migration(ctx: &GenerationContext<'_>) -> Vec<String> {
    let target = ctx.target;

    ctx.plan
        .active_tables()
        .map(|mapping| {
            if mapping.column_mappings.is_empty() {
                return format!(
                    "-- Table {} has no column mappings; no data copied to {}",
                    comment_text(&mapping.source_table),
                    comment_text(&mapping.target_table)
                );
            }

            let (columns, expressions): (Vec<String>, Vec<String>) = mapping
                .column_mappings
                .iter()
                .map(|c| {
                    let source = target.ident(&c.source_column);
                    let expr = match &c.transformation {
                        Some(t) => format!("{} AS {}", t, source),
                        None => source,
                    };
                    (target.ident(&c.target_column), expr)
                })
                .unzip();

            let mut sql = format!(
                "INSERT INTO {} ({})\nSELECT {}\nFROM {}",
                target.qualify(&mapping.target_table),
                columns.join(", "),
                expressions.join(", "),
                target.qualify(&mapping.source_table)
            );
            if let Some(filter) = mapping
                .filter_condition
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
            {
                sql.push_str(&format!("\nWHERE {}", filter));
            }
            sql
        })
        .collect()
}
