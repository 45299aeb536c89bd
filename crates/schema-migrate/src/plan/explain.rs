//! Natural-language plan explanation.

use tracing::warn;

use crate::core::TextGenerator;

use super::types::{MigrationPlan, ObjectMapping};

/// Build the explanation prompt from a structured plan summary.
pub fn explanation_prompt(plan: &MigrationPlan, target_dialect: &str) -> String {
    format!(
        "Explain the following database migration plan to {target} for a non-technical \
         reviewer. Describe what will be created, which data will be copied or converted, \
         what is skipped and any manual work that remains. Use short paragraphs and no SQL.\n\n\
         {summary}",
        target = target_dialect,
        summary = plan_summary(plan)
    )
}

/// Structured line-per-item summary of a plan.
pub fn plan_summary(plan: &MigrationPlan) -> String {
    let mut out = String::new();
    for table in &plan.table_mappings {
        if table.skip {
            out.push_str(&format!("Table {}: skipped\n", table.source_table));
            continue;
        }
        out.push_str(&format!(
            "Table {} -> {} ({} columns)\n",
            table.source_table,
            table.target_table,
            table.column_mappings.len()
        ));
        for column in &table.column_mappings {
            if let Some(t) = &column.transformation {
                out.push_str(&format!(
                    "  column {} -> {} converted with {}\n",
                    column.source_column, column.target_column, t
                ));
            } else if column.source_column != column.target_column {
                out.push_str(&format!(
                    "  column {} renamed to {}\n",
                    column.source_column, column.target_column
                ));
            }
        }
        if let Some(filter) = &table.filter_condition {
            out.push_str(&format!("  only rows where {}\n", filter));
        }
    }
    for (kind, mappings) in [
        ("View", &plan.view_mappings),
        ("Procedure", &plan.procedure_mappings),
        ("Trigger", &plan.trigger_mappings),
    ] {
        for m in mappings {
            let state = if m.skip {
                "skipped"
            } else if m.rewritten_definition.is_some() {
                "provided definition"
            } else {
                "converted during generation"
            };
            out.push_str(&format!("{} {} -> {}: {}\n", kind, m.source_name, m.target_name, state));
        }
    }
    if !plan.pre_migration_scripts.is_empty() {
        out.push_str(&format!(
            "{} custom script(s) run before the migration\n",
            plan.pre_migration_scripts.len()
        ));
    }
    if !plan.post_migration_scripts.is_empty() {
        out.push_str(&format!(
            "{} custom script(s) run after the migration\n",
            plan.post_migration_scripts.len()
        ));
    }
    if let Some(notes) = &plan.notes {
        out.push_str(&format!("Notes: {}\n", notes));
    }
    out
}

/// Deterministic explanation used when the generator is unavailable.
pub fn fallback_explanation(plan: &MigrationPlan) -> String {
    let active = plan.active_tables().count();
    let skipped = plan.table_mappings.len() - active;
    let transformed: usize = plan
        .active_tables()
        .map(|t| {
            t.column_mappings
                .iter()
                .filter(|c| c.transformation.is_some())
                .count()
        })
        .sum();

    let mut text = format!(
        "This plan migrates {} table(s), {} view(s), {} stored procedure(s) and {} trigger(s).",
        active,
        count_active(&plan.view_mappings),
        count_active(&plan.procedure_mappings),
        count_active(&plan.trigger_mappings)
    );
    if skipped > 0 {
        text.push_str(&format!(" {} table(s) are skipped.", skipped));
    }
    if transformed > 0 {
        text.push_str(&format!(
            " {} column(s) are converted to a new type while copying data.",
            transformed
        ));
    }
    let filtered = plan
        .active_tables()
        .filter(|t| t.filter_condition.is_some())
        .count();
    if filtered > 0 {
        text.push_str(&format!(" {} table(s) copy only a subset of rows.", filtered));
    }
    text.push_str("\n\n");
    text.push_str(&plan_summary(plan));
    text
}

fn count_active(mappings: &[ObjectMapping]) -> usize {
    mappings.iter().filter(|m| !m.skip).count()
}

/// Explain a plan, falling back to the deterministic summary.
pub async fn explain_plan(
    plan: &MigrationPlan,
    target_dialect: &str,
    generator: &dyn TextGenerator,
) -> String {
    match generator
        .generate_text(&explanation_prompt(plan, target_dialect))
        .await
    {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!("Explanation response was empty; using summary");
            fallback_explanation(plan)
        }
        Err(e) => {
            warn!("Plan explanation failed ({}); using summary", e);
            fallback_explanation(plan)
        }
    }
}
