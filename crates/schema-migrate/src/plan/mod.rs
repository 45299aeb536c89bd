//! Migration planning.
//!
//! - [`types`]: the [`MigrationPlan`] data model
//! - [`planner`]: initial plan construction from a schema analysis
//! - [`refine`]: optional refinement against free-text instructions
//! - [`explain`]: natural-language explanation for review

pub mod explain;
pub mod planner;
pub mod refine;
pub mod types;

pub use explain::{explain_plan, explanation_prompt, fallback_explanation, plan_summary};
pub use planner::{build_plan, read_transformation, view_placeholder};
pub use refine::{parse_refined_plan, refine_plan, refinement_prompt, validate_plan_shape};
pub use types::{
    ColumnMapping, MigrationPlan, ObjectMapping, ProcedureMapping, TableMapping, TriggerMapping,
    ViewMapping,
};
