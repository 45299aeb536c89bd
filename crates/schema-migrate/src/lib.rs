//! # schema-migrate
//!
//! Cross-dialect schema migration planning and SQL generation.
//!
//! This library turns a structural description of a source database into a
//! reviewable migration for another dialect, with support for:
//!
//! - **Migration plans** mapping tables, columns, views, procedures and triggers
//! - **Type mapping** between SQL Server, PostgreSQL, MySQL and Oracle types
//! - **DDL/DML generation** in execution order, as one script or per phase
//! - **Procedure and trigger conversion** through a pluggable text generator
//! - **Plan refinement and explanation** with deterministic fallbacks
//!
//! ## Example
//!
//! ```rust,no_run
//! use schema_migrate::{Config, SchemaAnalysisResult, SchemaConverter};
//!
//! #[tokio::main]
//! async fn main() -> schema_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let analysis: SchemaAnalysisResult =
//!         serde_json::from_str(&std::fs::read_to_string("analysis.json")?)?;
//!
//!     let converter = SchemaConverter::from_config(&config)?;
//!     let plan = converter
//!         .generate_migration_plan(&analysis, &config.target, None)
//!         .await;
//!     println!("{}", converter.generate_migration_script(&plan, &analysis).await);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod converter;
pub mod core;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod generate;
pub mod llm;
pub mod plan;
pub mod runner;

// Re-exports for convenient access
pub use config::{Config, DatabaseConnectionConfig, GeneratorConfig, MigrationConfig};
pub use converter::SchemaConverter;
pub use error::{MigrateError, Result};

pub use core::{
    ColumnDefinition, Dialect, DialectCatalog, ForeignKeyDefinition, IndexDefinition,
    ProcedureDefinition, ProcedureParameter, SchemaAnalysisResult, TableDefinition, TextGenerator,
    TriggerDefinition, ViewDefinition,
};
pub use dialect::{TypeFamily, TypeMapper, TypeMapping};
pub use drivers::{MssqlDialect, MysqlDialect, PostgresDialect};
pub use llm::{CommandGenerator, UnavailableGenerator};
pub use plan::{
    ColumnMapping, MigrationPlan, ObjectMapping, ProcedureMapping, TableMapping, TriggerMapping,
    ViewMapping,
};
pub use runner::{
    ExecutionOptions, MigrationResult, MigrationRunner, TableResult, TableValidation,
    ValidationResult,
};
