//! Execution and validation contract.
//!
//! Running SQL against live databases is the job of an external
//! [`MigrationRunner`]. The converter hands it the plan and turns any runner
//! error into a failed result.

mod types;

pub use types::{
    ExecutionOptions, MigrationResult, TableResult, TableValidation, ValidationResult,
};

use async_trait::async_trait;

use crate::config::DatabaseConnectionConfig;
use crate::error::Result;
use crate::plan::MigrationPlan;

/// Executes a plan and validates the outcome.
#[async_trait]
pub trait MigrationRunner: Send + Sync {
    /// Execute the plan against the target.
    async fn execute(
        &self,
        source: &DatabaseConnectionConfig,
        target: &DatabaseConnectionConfig,
        plan: &MigrationPlan,
        options: &ExecutionOptions,
    ) -> Result<MigrationResult>;

    /// Compare source and target after execution.
    async fn validate(
        &self,
        source: &DatabaseConnectionConfig,
        target: &DatabaseConnectionConfig,
        plan: &MigrationPlan,
        result: &MigrationResult,
    ) -> Result<ValidationResult>;

    fn name(&self) -> &str {
        "runner"
    }
}
