//! Plan refinement against free-text instructions.
//!
//! The generator is asked for a replacement plan in JSON. The response is
//! untrusted: it must deserialize into a [`MigrationPlan`] and agree with the
//! analysed schema, otherwise the original plan is kept.

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::core::identifier::validate_identifier;
use crate::core::{SchemaAnalysisResult, TextGenerator};
use crate::error::{MigrateError, Result};
use crate::llm::extract_json_object;

use super::types::MigrationPlan;

/// Build the refinement prompt.
pub fn refinement_prompt(
    plan: &MigrationPlan,
    analysis: &SchemaAnalysisResult,
    target_dialect: &str,
    instructions: &str,
) -> Result<String> {
    let plan_json = serde_json::to_string_pretty(plan)?;
    Ok(format!(
        "You are a database migration expert. Adjust the migration plan below from {source} to \
         {target} according to these instructions:\n\
         {instructions}\n\n\
         Source schema:\n{summary}\n\
         Current plan (JSON):\n{plan_json}\n\n\
         Respond with the complete modified plan as a single JSON object using the same field \
         names. You may rename targets, drop or add column mappings, set \"skip\", add \
         \"transformation\" expressions, \"filterCondition\" fragments and \
         \"preMigrationScripts\"/\"postMigrationScripts\". Do not invent source tables or columns.",
        source = analysis.database_type,
        target = target_dialect,
        instructions = instructions.trim(),
        summary = schema_summary(analysis),
        plan_json = plan_json,
    ))
}

/// Structural summary of the source schema (no object bodies).
pub fn schema_summary(analysis: &SchemaAnalysisResult) -> String {
    let mut out = String::new();
    for table in &analysis.tables {
        out.push_str(&format!("- table {}\n", table.full_name()));
        for col in &table.columns {
            let null = if col.is_nullable { "" } else { " NOT NULL" };
            let identity = if col.is_identity { " IDENTITY" } else { "" };
            out.push_str(&format!("    {} {}{}{}\n", col.name, col.data_type, null, identity));
        }
        if let Some(pk) = table.primary_key.as_ref().filter(|pk| !pk.is_empty()) {
            out.push_str(&format!("    PRIMARY KEY ({})\n", pk.join(", ")));
        }
        for fk in &table.foreign_keys {
            out.push_str(&format!(
                "    FOREIGN KEY ({}) REFERENCES {} ({})\n",
                fk.columns.join(", "),
                fk.referenced_full_name(),
                fk.referenced_columns.join(", ")
            ));
        }
    }
    for view in &analysis.views {
        out.push_str(&format!("- view {}\n", view.full_name()));
    }
    for procedure in &analysis.procedures {
        out.push_str(&format!("- procedure {}\n", procedure.full_name()));
    }
    for trigger in &analysis.triggers {
        out.push_str(&format!("- trigger {} on {}\n", trigger.full_name(), trigger.table));
    }
    out
}

/// Parse and validate a refined plan out of a generator response.
///
/// The original `createdAt` is carried over.
pub fn parse_refined_plan(
    response: &str,
    original: &MigrationPlan,
    analysis: &SchemaAnalysisResult,
) -> Result<MigrationPlan> {
    let value = extract_json_object(response)
        .ok_or_else(|| MigrateError::plan("response contains no JSON object"))?;

    // Accept the plan wrapped in a single envelope key.
    let envelope = value
        .get("plan")
        .or_else(|| value.get("migrationPlan"))
        .filter(|inner| inner.is_object())
        .cloned();
    let value: Value = envelope.unwrap_or(value);
    if value.get("tableMappings").is_none() {
        return Err(MigrateError::plan("response has no tableMappings"));
    }

    let mut plan: MigrationPlan = serde_json::from_value(value)?;
    validate_plan_shape(&plan, analysis)?;
    plan.created_at = original.created_at;
    Ok(plan)
}

/// Check that a plan only refers to objects present in the analysis.
pub fn validate_plan_shape(plan: &MigrationPlan, analysis: &SchemaAnalysisResult) -> Result<()> {
    for mapping in &plan.table_mappings {
        let table = analysis.find_table(&mapping.source_table).ok_or_else(|| {
            MigrateError::plan(format!("unknown source table '{}'", mapping.source_table))
        })?;
        validate_identifier(&mapping.target_table)?;

        for column in &mapping.column_mappings {
            validate_identifier(&column.source_column)?;
            validate_identifier(&column.target_column)?;
            if table.column(&column.source_column).is_none() && column.transformation.is_none() {
                return Err(MigrateError::plan(format!(
                    "unknown source column '{}.{}'",
                    mapping.source_table, column.source_column
                )));
            }
        }
    }

    for (kind, mappings) in [
        ("view", &plan.view_mappings),
        ("procedure", &plan.procedure_mappings),
        ("trigger", &plan.trigger_mappings),
    ] {
        for mapping in mappings {
            validate_identifier(&mapping.source_name)
                .and_then(|_| validate_identifier(&mapping.target_name))
                .map_err(|e| MigrateError::plan(format!("{} mapping: {}", kind, e)))?;
        }
    }
    Ok(())
}

/// Ask the generator to refine a plan.
///
/// Never fails: any generator error or invalid response returns `plan`
/// unchanged.
pub async fn refine_plan(
    plan: MigrationPlan,
    analysis: &SchemaAnalysisResult,
    target_dialect: &str,
    instructions: &str,
    generator: &dyn TextGenerator,
) -> MigrationPlan {
    let prompt = match refinement_prompt(&plan, analysis, target_dialect, instructions) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!("Could not build refinement prompt: {}", e);
            return plan;
        }
    };

    let response = match generator.generate_text(&prompt).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Plan refinement failed ({}); keeping the original plan", e);
            return plan;
        }
    };

    match parse_refined_plan(&response, &plan, analysis) {
        Ok(mut refined) => {
            refined.modified_at = Some(Utc::now());
            if refined.notes.is_none() {
                refined.notes = Some(format!("Refined with instructions: {}", instructions.trim()));
            }
            info!(
                "Applied refined plan: {} table mappings",
                refined.table_mappings.len()
            );
            refined
        }
        Err(e) => {
            warn!("Rejected refined plan ({}); keeping the original plan", e);
            plan
        }
    }
}
