//! Views, stored procedures and triggers.
//!
//! Procedures and triggers crossing dialects are converted by the text
//! generator. Responses are checked with [`accept_conversion`]; anything that
//! fails the check, and any generator error, becomes a manual-conversion
//! comment carrying the original definition.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::core::identifier::{qualified_name, split_qualified};
use crate::core::{ProcedureDefinition, TextGenerator, TriggerDefinition};
use crate::llm::strip_code_fences;
use crate::plan::ObjectMapping;

use super::{comment_text, GenerationContext};

/// Kind of routine or view being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    View,
    Procedure,
    Trigger,
}

impl ObjectKind {
    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::View => "view",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Trigger => "trigger",
        }
    }
}

/// Check a generated conversion; returns the cleaned SQL when acceptable.
///
/// The text must contain `create` plus `procedure`/`function` for
/// procedures, `trigger` for triggers, or `view` for views. A trigger
/// response that never mentions a trigger is rejected.
pub fn accept_conversion(response: &str, kind: ObjectKind) -> Option<String> {
    let sql = strip_code_fences(response);
    let lower = sql.to_lowercase();
    if !lower.contains("create") {
        return None;
    }
    let accepted = match kind {
        ObjectKind::Procedure => lower.contains("procedure") || lower.contains("function"),
        ObjectKind::Trigger => lower.contains("trigger"),
        ObjectKind::View => lower.contains("view"),
    };
    accepted.then_some(sql)
}

/// Comment block marking an object for manual conversion.
///
/// The name and reason are flattened onto the first line. The original
/// definition, when known, is carried along commented out line by line.
pub fn manual_conversion_comment(
    kind: ObjectKind,
    name: &str,
    reason: &str,
    original: Option<&str>,
) -> String {
    let mut out = format!(
        "-- MANUAL CONVERSION REQUIRED: {} {} ({})",
        kind.label(),
        comment_text(name),
        comment_text(reason)
    );
    if let Some(original) = original {
        for line in original.trim().lines() {
            out.push_str("\n-- ");
            out.push_str(line.trim_end());
        }
    }
    out
}

/// Prompt for converting a stored procedure.
pub fn procedure_prompt(
    procedure: &ProcedureDefinition,
    target_name: &str,
    source_dialect: &str,
    ctx: &GenerationContext<'_>,
) -> String {
    let params = if procedure.parameters.is_empty() {
        "(none)".to_string()
    } else {
        procedure
            .parameters
            .iter()
            .map(|p| {
                format!(
                    "{} {} {}",
                    p.direction.as_deref().unwrap_or("IN"),
                    p.name,
                    p.data_type
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Convert this {source} stored procedure to idiomatic {target} ({language}).\n\
         Source name: {name}\n\
         Target name: {target_name}\n\
         Parameters: {params}\n\
         Return type: {returns}\n\n\
         Original definition:\n{definition}\n\n\
         Respond with the complete CREATE statement only, without explanations.",
        source = source_dialect,
        target = ctx.target.name(),
        language = ctx.target.procedural_language(),
        name = procedure.full_name(),
        target_name = target_name,
        params = params,
        returns = procedure.return_type.as_deref().unwrap_or("(none)"),
        definition = procedure.definition.trim(),
    )
}

/// Prompt for converting a trigger.
pub fn trigger_prompt(
    trigger: &TriggerDefinition,
    target_name: &str,
    target_table: &str,
    source_dialect: &str,
    ctx: &GenerationContext<'_>,
) -> String {
    format!(
        "Convert this {source} trigger to idiomatic {target} ({language}).\n\
         Source name: {name}\n\
         Target name: {target_name}\n\
         Table: {table}\n\
         Events: {events}\n\
         Timing: {timing}\n\
         Row level: {row_level}\n\n\
         Original definition:\n{definition}\n\n\
         {guidance}\n\
         Respond with the complete CREATE statements only, without explanations.",
        source = source_dialect,
        target = ctx.target.name(),
        language = ctx.target.procedural_language(),
        name = trigger.full_name(),
        target_name = target_name,
        table = target_table,
        events = trigger.events.join(", "),
        timing = trigger.timing,
        row_level = if trigger.for_each_row { "yes" } else { "no" },
        definition = trigger.definition.trim(),
        guidance = ctx.target.trigger_guidance(),
    )
}

/// Convert every active procedure mapping, concurrently, in plan order.
pub async fn convert_procedures(
    ctx: &GenerationContext<'_>,
    generator: &dyn TextGenerator,
) -> Vec<String> {
    let conversions = ctx
        .plan
        .procedure_mappings
        .iter()
        .filter(|m| !m.skip)
        .map(|mapping| convert_procedure(ctx, mapping, generator));
    join_all(conversions).await
}

async fn convert_procedure(
    ctx: &GenerationContext<'_>,
    mapping: &ObjectMapping,
    generator: &dyn TextGenerator,
) -> String {
    let kind = ObjectKind::Procedure;
    if let Some(definition) = &mapping.rewritten_definition {
        return definition.clone();
    }
    let Some(procedure) = ctx.analysis.find_procedure(&mapping.source_name) else {
        warn!("Procedure {} not found in schema analysis", mapping.source_name);
        return manual_conversion_comment(kind, &mapping.source_name, "not found in the source schema", None);
    };
    if ctx.same_dialect() {
        return procedure.definition.clone();
    }

    let prompt = procedure_prompt(procedure, &mapping.target_name, ctx.mapper.source_dialect(), ctx);
    request_conversion(kind, &mapping.source_name, &procedure.definition, &prompt, generator).await
}

/// Convert every active trigger mapping, concurrently, in plan order.
pub async fn convert_triggers(
    ctx: &GenerationContext<'_>,
    generator: &dyn TextGenerator,
) -> Vec<String> {
    let conversions = ctx
        .plan
        .trigger_mappings
        .iter()
        .filter(|m| !m.skip)
        .map(|mapping| convert_trigger(ctx, mapping, generator));
    join_all(conversions).await
}

async fn convert_trigger(
    ctx: &GenerationContext<'_>,
    mapping: &ObjectMapping,
    generator: &dyn TextGenerator,
) -> String {
    let kind = ObjectKind::Trigger;
    if let Some(definition) = &mapping.rewritten_definition {
        return definition.clone();
    }
    let Some(trigger) = ctx.analysis.find_trigger(&mapping.source_name) else {
        warn!("Trigger {} not found in schema analysis", mapping.source_name);
        return manual_conversion_comment(kind, &mapping.source_name, "not found in the source schema", None);
    };

    // The trigger's table defaults to the trigger's own schema.
    let source_table = match split_qualified(&trigger.table) {
        (Some(_), _) => trigger.table.clone(),
        (None, table) => qualified_name(trigger.schema.as_deref(), table),
    };
    let target_table = match ctx.plan.find_table(&source_table) {
        Some(table_mapping) if table_mapping.skip => {
            debug!("Trigger {} belongs to skipped table {}", mapping.source_name, source_table);
            return format!(
                "-- Trigger {} omitted: table {} is skipped",
                comment_text(&mapping.source_name),
                comment_text(&source_table)
            );
        }
        Some(table_mapping) => table_mapping.target_table.clone(),
        None => source_table,
    };

    if ctx.same_dialect() {
        return trigger.definition.clone();
    }

    let prompt = trigger_prompt(
        trigger,
        &mapping.target_name,
        &target_table,
        ctx.mapper.source_dialect(),
        ctx,
    );
    request_conversion(kind, &mapping.source_name, &trigger.definition, &prompt, generator).await
}

async fn request_conversion(
    kind: ObjectKind,
    name: &str,
    original: &str,
    prompt: &str,
    generator: &dyn TextGenerator,
) -> String {
    match generator.generate_text(prompt).await {
        Ok(response) => match accept_conversion(&response, kind) {
            Some(sql) => {
                debug!("Converted {} {}", kind.label(), name);
                sql
            }
            None => {
                warn!("Rejected generated {} for {}", kind.label(), name);
                manual_conversion_comment(
                    kind,
                    name,
                    "generated conversion did not pass validation",
                    Some(original),
                )
            }
        },
        Err(e) => {
            warn!("Conversion of {} {} failed: {}", kind.label(), name, e);
            manual_conversion_comment(kind, name, &format!("conversion failed: {}", e), Some(original))
        }
    }
}

/// Generate view DDL for every active view mapping.
///
/// Views are never sent to the generator.
pub fn generate_views(ctx: &GenerationContext<'_>) -> Vec<String> {
    ctx.plan
        .view_mappings
        .iter()
        .filter(|m| !m.skip)
        .map(|mapping| {
            if let Some(definition) = &mapping.rewritten_definition {
                return definition.clone();
            }
            match ctx.analysis.find_view(&mapping.source_name) {
                Some(view) if ctx.same_dialect() => view.definition.clone(),
                Some(view) => manual_conversion_comment(
                    ObjectKind::View,
                    &mapping.source_name,
                    "views are not converted automatically",
                    Some(&view.definition),
                ),
                None => manual_conversion_comment(
                    ObjectKind::View,
                    &mapping.source_name,
                    "not found in the source schema",
                    None,
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Dialect, SchemaAnalysisResult, ViewDefinition};
    use crate::dialect::TypeMapper;
    use crate::drivers::PostgresDialect;
    use crate::error::{MigrateError, Result};
    use crate::plan::{MigrationPlan, TableMapping};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedGenerator {
        response: String,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate_text(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Echo the object name so ordering can be checked.
            let name = prompt
                .lines()
                .find_map(|l| l.strip_prefix("Source name: "))
                .unwrap_or("");
            Ok(self.response.replace("{name}", name))
        }
    }

    /// Fails every request with a multi-line error, like a crashed command.
    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate_text(&self, _prompt: &str) -> Result<String> {
            Err(MigrateError::generation(
                "llm exited with 1: Traceback\nDROP TABLE customers\r\nraise",
            ))
        }
    }

    fn analysis() -> SchemaAnalysisResult {
        SchemaAnalysisResult {
            database_type: "mssql".to_string(),
            procedures: vec![
                ProcedureDefinition {
                    name: "usp_a".to_string(),
                    schema: Some("dbo".to_string()),
                    parameters: vec![],
                    return_type: None,
                    definition: "CREATE PROCEDURE dbo.usp_a AS SELECT 1".to_string(),
                },
                ProcedureDefinition {
                    name: "usp_b".to_string(),
                    schema: Some("dbo".to_string()),
                    parameters: vec![],
                    return_type: None,
                    definition: "CREATE PROCEDURE dbo.usp_b AS SELECT 2".to_string(),
                },
            ],
            triggers: vec![TriggerDefinition {
                name: "trg_orders_audit".to_string(),
                schema: Some("dbo".to_string()),
                table: "orders".to_string(),
                events: vec!["INSERT".to_string()],
                timing: "AFTER".to_string(),
                for_each_row: false,
                definition: "CREATE TRIGGER trg_orders_audit ON orders AFTER INSERT AS\nBEGIN\n  SELECT 1\nEND"
                    .to_string(),
            }],
            views: vec![ViewDefinition {
                name: "v_orders".to_string(),
                schema: Some("dbo".to_string()),
                definition: "CREATE VIEW dbo.v_orders AS SELECT * FROM dbo.orders".to_string(),
            }],
            ..Default::default()
        }
    }

    fn plan() -> MigrationPlan {
        MigrationPlan {
            table_mappings: vec![TableMapping {
                source_table: "dbo.orders".to_string(),
                target_table: "sales.orders".to_string(),
                column_mappings: vec![],
                skip: false,
                filter_condition: None,
            }],
            procedure_mappings: vec![
                ObjectMapping::new("dbo.usp_a", "usp_a"),
                ObjectMapping::new("dbo.usp_b", "usp_b"),
                ObjectMapping::new("dbo.usp_missing", "usp_missing"),
            ],
            trigger_mappings: vec![ObjectMapping::new("dbo.trg_orders_audit", "trg_orders_audit")],
            view_mappings: vec![ObjectMapping::new("dbo.v_orders", "v_orders")],
            ..Default::default()
        }
    }

    fn mssql_to_pg() -> (Arc<dyn Dialect>, TypeMapper) {
        let target: Arc<dyn Dialect> = Arc::new(PostgresDialect::new());
        let mapper = TypeMapper::for_pair("mssql", target.clone()).unwrap();
        (target, mapper)
    }

    #[test]
    fn test_accept_conversion() {
        assert_eq!(
            accept_conversion("```sql\nCREATE FUNCTION f() RETURNS void AS $$ $$;\n```", ObjectKind::Procedure)
                .as_deref(),
            Some("CREATE FUNCTION f() RETURNS void AS $$ $$;")
        );
        assert!(accept_conversion("CREATE PROCEDURE p AS SELECT 1", ObjectKind::Procedure).is_some());
        assert!(accept_conversion("CREATE TRIGGER t ...", ObjectKind::Trigger).is_some());
        assert!(accept_conversion("I cannot convert this trigger.", ObjectKind::Trigger).is_none());
        assert!(accept_conversion("CREATE TABLE t (a int)", ObjectKind::Trigger).is_none());
        assert!(accept_conversion(
            "CREATE FUNCTION audit_orders() RETURNS void AS $$ $$ LANGUAGE sql;",
            ObjectKind::Trigger
        )
        .is_none());
        assert!(accept_conversion(
            "CREATE FUNCTION audit_orders() RETURNS trigger AS $$ BEGIN RETURN NEW; END $$ LANGUAGE plpgsql;\n\
             CREATE TRIGGER trg AFTER INSERT ON orders FOR EACH ROW EXECUTE FUNCTION audit_orders();",
            ObjectKind::Trigger
        )
        .is_some());
        assert!(accept_conversion("", ObjectKind::Procedure).is_none());
    }

    #[test]
    fn test_manual_conversion_comment_is_comment_only() {
        let comment = manual_conversion_comment(
            ObjectKind::Trigger,
            "dbo.t",
            "x",
            Some("CREATE TRIGGER t\nAS BEGIN\nEND"),
        );
        assert!(comment.lines().all(|l| l.starts_with("--")));
        assert!(comment.contains("-- AS BEGIN"));
    }

    #[tokio::test]
    async fn test_generator_error_stays_inside_comment() {
        let (target, mapper) = mssql_to_pg();
        let (plan, analysis) = (plan(), analysis());
        let ctx = GenerationContext::new(&plan, &analysis, target.as_ref(), &mapper);

        let mut converted = convert_procedures(&ctx, &FailingGenerator).await;
        converted.extend(convert_triggers(&ctx, &FailingGenerator).await);
        for sql in &converted {
            assert!(sql.lines().all(|l| l.starts_with("--")), "{}", sql);
        }
        assert!(converted[0].starts_with(
            "-- MANUAL CONVERSION REQUIRED: procedure dbo.usp_a (conversion failed: \
             Text generation failed: llm exited with 1: Traceback DROP TABLE customers raise)"
        ));
    }

    #[test]
    fn test_manual_conversion_comment_flattens_name() {
        let comment = manual_conversion_comment(ObjectKind::Procedure, "dbo.p\nDROP TABLE x", "bad\rreason", None);
        assert_eq!(
            comment,
            "-- MANUAL CONVERSION REQUIRED: procedure dbo.p DROP TABLE x (bad reason)"
        );
    }

    #[tokio::test]
    async fn test_convert_procedures_in_plan_order() {
        let (target, mapper) = mssql_to_pg();
        let (plan, analysis) = (plan(), analysis());
        let ctx = GenerationContext::new(&plan, &analysis, target.as_ref(), &mapper);
        let generator = ScriptedGenerator::new("CREATE OR REPLACE FUNCTION converted_{name}() ...");

        let converted = convert_procedures(&ctx, &generator).await;
        assert_eq!(converted.len(), 3);
        assert!(converted[0].contains("converted_dbo.usp_a"));
        assert!(converted[1].contains("converted_dbo.usp_b"));
        assert!(converted[2].starts_with("-- MANUAL CONVERSION REQUIRED: procedure dbo.usp_missing"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rewritten_definition_wins() {
        let (target, mapper) = mssql_to_pg();
        let mut plan = plan();
        plan.procedure_mappings[0].rewritten_definition = Some("CREATE FUNCTION usp_a() ...".to_string());
        plan.procedure_mappings[1].skip = true;
        plan.procedure_mappings.truncate(2);
        let analysis = analysis();
        let ctx = GenerationContext::new(&plan, &analysis, target.as_ref(), &mapper);
        let generator = ScriptedGenerator::new("unused");

        let converted = convert_procedures(&ctx, &generator).await;
        assert_eq!(converted, vec!["CREATE FUNCTION usp_a() ...".to_string()]);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_trigger_response_becomes_manual_comment() {
        let (target, mapper) = mssql_to_pg();
        let (plan, analysis) = (plan(), analysis());
        let ctx = GenerationContext::new(&plan, &analysis, target.as_ref(), &mapper);
        let generator = ScriptedGenerator::new("Sorry, I am unable to help with that.");

        let converted = convert_triggers(&ctx, &generator).await;
        assert_eq!(converted.len(), 1);
        assert!(converted[0].starts_with("-- MANUAL CONVERSION REQUIRED: trigger dbo.trg_orders_audit"));
        assert!(!converted[0].contains("Sorry"));
        assert!(converted[0].contains("-- CREATE TRIGGER trg_orders_audit"));
    }

    #[tokio::test]
    async fn test_trigger_prompt_uses_target_table() {
        let (target, mapper) = mssql_to_pg();
        let (plan, analysis) = (plan(), analysis());
        let ctx = GenerationContext::new(&plan, &analysis, target.as_ref(), &mapper);
        let prompt = trigger_prompt(&analysis.triggers[0], "trg_orders_audit", "sales.orders", "mssql", &ctx);
        assert!(prompt.contains("Table: sales.orders"));
        assert!(prompt.contains("Row level: no"));
        assert!(prompt.contains("RETURNS trigger"));
    }

    #[tokio::test]
    async fn test_trigger_on_skipped_table_is_omitted() {
        let (target, mapper) = mssql_to_pg();
        let mut plan = plan();
        plan.table_mappings[0].skip = true;
        let analysis = analysis();
        let ctx = GenerationContext::new(&plan, &analysis, target.as_ref(), &mapper);
        let generator = ScriptedGenerator::new("CREATE TRIGGER x");
        let converted = convert_triggers(&ctx, &generator).await;
        assert!(converted[0].starts_with("-- Trigger dbo.trg_orders_audit omitted"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_same_dialect_copies_definitions() {
        let target: Arc<dyn Dialect> = Arc::new(PostgresDialect::new());
        let mapper = TypeMapper::identity(target.clone());
        let (plan, analysis) = (plan(), analysis());
        let ctx = GenerationContext::new(&plan, &analysis, target.as_ref(), &mapper);
        let generator = ScriptedGenerator::new("unused");

        let converted = convert_procedures(&ctx, &generator).await;
        assert_eq!(converted[0], "CREATE PROCEDURE dbo.usp_a AS SELECT 1");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            generate_views(&ctx),
            vec!["CREATE VIEW dbo.v_orders AS SELECT * FROM dbo.orders".to_string()]
        );
    }

    #[test]
    fn test_views_across_dialects_need_manual_conversion() {
        let (target, mapper) = mssql_to_pg();
        let (plan, analysis) = (plan(), analysis());
        let ctx = GenerationContext::new(&plan, &analysis, target.as_ref(), &mapper);
        let views = generate_views(&ctx);
        assert!(views[0].starts_with("-- MANUAL CONVERSION REQUIRED: view dbo.v_orders"));
    }
}
