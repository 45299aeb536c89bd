//! Engine entry point.
//!
//! [`SchemaConverter`] wires the target dialect, the type mapper, the text
//! generator and an optional runner together. One converter serves any number
//! of plans; the only state it keeps is the memoized type mapper per source
//! dialect.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{Config, DatabaseConnectionConfig, MigrationConfig};
use crate::core::{Dialect, DialectCatalog, SchemaAnalysisResult, TextGenerator};
use crate::dialect::{TypeMapper, TypeMapping};
use crate::error::Result;
use crate::generate::{
    convert_procedures, convert_triggers, generate_data_migration, generate_foreign_keys,
    generate_indexes, generate_tables, generate_views, join_statements, GenerationContext,
    ScriptBuilder,
};
use crate::llm::{CommandGenerator, UnavailableGenerator};
use crate::plan::{build_plan, explain_plan, refine_plan, MigrationPlan};
use crate::runner::{ExecutionOptions, MigrationResult, MigrationRunner, ValidationResult};

/// Converts source schema analyses into plans and scripts for one target dialect.
pub struct SchemaConverter {
    target: Arc<dyn Dialect>,
    migration: MigrationConfig,
    generator: Arc<dyn TextGenerator>,
    runner: Option<Arc<dyn MigrationRunner>>,
    mappers: Mutex<HashMap<String, Arc<TypeMapper>>>,
}

impl SchemaConverter {
    /// Create a converter for a target dialect with default settings.
    pub fn new(target: Arc<dyn Dialect>) -> Self {
        Self {
            target,
            migration: MigrationConfig::default(),
            generator: Arc::new(UnavailableGenerator),
            runner: None,
            mappers: Mutex::new(HashMap::new()),
        }
    }

    /// Create a converter for the dialect named by a connection config.
    pub fn for_target(target_config: &DatabaseConnectionConfig) -> Result<Self> {
        Self::with_catalog(&DialectCatalog::with_builtins(), target_config)
    }

    /// Create a converter, resolving the target dialect through `catalog`.
    pub fn with_catalog(
        catalog: &DialectCatalog,
        target_config: &DatabaseConnectionConfig,
    ) -> Result<Self> {
        Ok(Self::new(catalog.create(&target_config.r#type)?))
    }

    /// Create a converter from a loaded configuration.
    ///
    /// A configured generator command becomes the text generator.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut converter =
            Self::for_target(&config.target)?.with_migration_config(config.migration.clone());
        if let Some(generator) = &config.generator {
            converter = converter.with_generator(Arc::new(CommandGenerator::from_config(generator)?));
        }
        Ok(converter)
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn MigrationRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn with_migration_config(mut self, migration: MigrationConfig) -> Self {
        self.migration = migration;
        self
    }

    pub fn target_dialect(&self) -> &dyn Dialect {
        self.target.as_ref()
    }

    pub fn migration_config(&self) -> &MigrationConfig {
        &self.migration
    }

    /// Type mapper for a source dialect, bootstrapped at most once.
    pub async fn type_mapper(&self, source_dialect: &str) -> Arc<TypeMapper> {
        let key = crate::core::normalize_dialect_name(source_dialect);
        let mut mappers = self.mappers.lock().await;
        if let Some(mapper) = mappers.get(&key) {
            return mapper.clone();
        }
        let mapper = Arc::new(
            TypeMapper::bootstrap(&key, self.target.clone(), self.generator.as_ref()).await,
        );
        info!(
            "Type mapper ready: {} → {} ({:?})",
            mapper.source_dialect(),
            mapper.target_dialect(),
            mapper.table_source()
        );
        mappers.insert(key, mapper.clone());
        mapper
    }

    /// Map one source type to the target dialect.
    pub async fn map_type(&self, source_type: &str, source_dialect: &str) -> TypeMapping {
        self.type_mapper(source_dialect).await.map_type(source_type)
    }

    /// Build a plan, refining it when instructions are given.
    ///
    /// Falls back to the configured `custom_instructions` when none are passed.
    pub async fn generate_migration_plan(
        &self,
        analysis: &SchemaAnalysisResult,
        target_config: &DatabaseConnectionConfig,
        custom_instructions: Option<&str>,
    ) -> MigrationPlan {
        let mapper = self.type_mapper(&analysis.database_type).await;
        let plan = build_plan(analysis, target_config, self.target.as_ref(), &mapper);

        let instructions = custom_instructions
            .or(self.migration.custom_instructions.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        match instructions {
            Some(instructions) => {
                refine_plan(
                    plan,
                    analysis,
                    self.target.name(),
                    instructions,
                    self.generator.as_ref(),
                )
                .await
            }
            None => plan,
        }
    }

    /// Render the complete migration script.
    ///
    /// Sections follow execution order; indexes, foreign keys, comments and
    /// data movement honor the migration config toggles.
    pub async fn generate_migration_script(
        &self,
        plan: &MigrationPlan,
        analysis: &SchemaAnalysisResult,
    ) -> String {
        let mapper = self.type_mapper(&analysis.database_type).await;
        let ctx = GenerationContext::new(plan, analysis, self.target.as_ref(), &mapper);
        let opts = &self.migration;

        let tables = generate_tables(&ctx);
        let indexes = if opts.create_indexes {
            generate_indexes(&ctx)
        } else {
            Vec::new()
        };
        let foreign_keys = if opts.create_foreign_keys {
            generate_foreign_keys(&ctx)
        } else {
            Vec::new()
        };
        let data = if opts.include_data {
            generate_data_migration(&ctx)
        } else {
            Vec::new()
        };
        let (procedures, triggers) = futures::join!(
            convert_procedures(&ctx, self.generator.as_ref()),
            convert_triggers(&ctx, self.generator.as_ref())
        );

        let mut builder = ScriptBuilder::new()
            .header_line(format!(
                "Migration script: {} to {}",
                mapper.source_dialect(),
                self.target.name()
            ))
            .header_line(format!("Plan created {}", plan.created_at.to_rfc3339()));
        if let Some(notes) = plan.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            for line in notes.lines() {
                builder = builder.header_line(format!("Notes: {}", line.trim()));
            }
        }

        let script = builder
            .section("Pre-migration scripts", plan.pre_migration_scripts.clone())
            .section("Schemas", tables.schemas)
            .section("Sequences", tables.sequences)
            .section("Tables", tables.tables)
            .section(
                "Comments",
                if opts.add_comments { tables.comments } else { Vec::new() },
            )
            .section("Indexes", indexes)
            .section("Foreign keys", foreign_keys)
            .section("Data migration", data)
            .section("Views", generate_views(&ctx))
            .section("Stored procedures", procedures)
            .section("Triggers", triggers)
            .section("Post-migration scripts", plan.post_migration_scripts.clone())
            .build();

        info!(
            "Generated migration script for {} tables ({} bytes)",
            plan.active_tables().count(),
            script.len()
        );
        script
    }

    /// Schemas, sequences, tables and provenance comments.
    pub async fn generate_tables_ddl(
        &self,
        plan: &MigrationPlan,
        analysis: &SchemaAnalysisResult,
    ) -> String {
        let mapper = self.type_mapper(&analysis.database_type).await;
        let ctx = GenerationContext::new(plan, analysis, self.target.as_ref(), &mapper);
        join_statements(&generate_tables(&ctx).into_statements())
    }

    pub async fn generate_indexes_ddl(
        &self,
        plan: &MigrationPlan,
        analysis: &SchemaAnalysisResult,
    ) -> String {
        let mapper = self.type_mapper(&analysis.database_type).await;
        let ctx = GenerationContext::new(plan, analysis, self.target.as_ref(), &mapper);
        join_statements(&generate_indexes(&ctx))
    }

    pub async fn generate_foreign_keys_ddl(
        &self,
        plan: &MigrationPlan,
        analysis: &SchemaAnalysisResult,
    ) -> String {
        let mapper = self.type_mapper(&analysis.database_type).await;
        let ctx = GenerationContext::new(plan, analysis, self.target.as_ref(), &mapper);
        join_statements(&generate_foreign_keys(&ctx))
    }

    pub async fn generate_data_migration_dml(
        &self,
        plan: &MigrationPlan,
        analysis: &SchemaAnalysisResult,
    ) -> String {
        let mapper = self.type_mapper(&analysis.database_type).await;
        let ctx = GenerationContext::new(plan, analysis, self.target.as_ref(), &mapper);
        join_statements(&generate_data_migration(&ctx))
    }

    pub async fn generate_views_ddl(
        &self,
        plan: &MigrationPlan,
        analysis: &SchemaAnalysisResult,
    ) -> String {
        let mapper = self.type_mapper(&analysis.database_type).await;
        let ctx = GenerationContext::new(plan, analysis, self.target.as_ref(), &mapper);
        join_statements(&generate_views(&ctx))
    }

    pub async fn convert_stored_procedures(
        &self,
        plan: &MigrationPlan,
        analysis: &SchemaAnalysisResult,
    ) -> String {
        let mapper = self.type_mapper(&analysis.database_type).await;
        let ctx = GenerationContext::new(plan, analysis, self.target.as_ref(), &mapper);
        join_statements(&convert_procedures(&ctx, self.generator.as_ref()).await)
    }

    pub async fn convert_triggers(
        &self,
        plan: &MigrationPlan,
        analysis: &SchemaAnalysisResult,
    ) -> String {
        let mapper = self.type_mapper(&analysis.database_type).await;
        let ctx = GenerationContext::new(plan, analysis, self.target.as_ref(), &mapper);
        join_statements(&convert_triggers(&ctx, self.generator.as_ref()).await)
    }

    /// Natural-language summary of a plan.
    pub async fn explain_plan(&self, plan: &MigrationPlan) -> String {
        explain_plan(plan, self.target.name(), self.generator.as_ref()).await
    }

    /// Hand the plan to the runner.
    ///
    /// Runner errors, and a missing runner, become a failed result.
    pub async fn execute_migration(
        &self,
        source: &DatabaseConnectionConfig,
        target: &DatabaseConnectionConfig,
        plan: &MigrationPlan,
        options: &ExecutionOptions,
    ) -> MigrationResult {
        let Some(runner) = &self.runner else {
            warn!("Migration requested but no runner is configured");
            return MigrationResult::failed("no migration runner configured");
        };

        info!("Executing migration with {}", runner.name());
        match runner.execute(source, target, plan, options).await {
            Ok(result) => {
                info!(
                    "Migration finished: success={}, {} rows",
                    result.success, result.total_rows_processed
                );
                result
            }
            Err(e) => {
                warn!("Migration runner failed: {}", e);
                MigrationResult::failed(e.to_string())
            }
        }
    }

    /// Ask the runner to validate a completed migration.
    pub async fn validate_migration(
        &self,
        source: &DatabaseConnectionConfig,
        target: &DatabaseConnectionConfig,
        plan: &MigrationPlan,
        result: &MigrationResult,
    ) -> ValidationResult {
        let Some(runner) = &self.runner else {
            warn!("Validation requested but no runner is configured");
            return ValidationResult::failed("no migration runner configured");
        };

        match runner.validate(source, target, plan, result).await {
            Ok(validation) => {
                if !validation.success {
                    warn!("Validation reported {} issue(s)", validation.issues.len());
                }
                validation
            }
            Err(e) => {
                warn!("Validation failed: {}", e);
                ValidationResult::failed(e.to_string())
            }
        }
    }
}
