//! Core abstractions for dialect-aware migration generation.
//!
//! - [`schema`]: source schema description (`SchemaAnalysisResult`)
//! - [`identifier`]: qualified names and identifier quoting
//! - [`traits`]: `Dialect` and `TextGenerator` seams
//! - [`catalog`]: dialect registry keyed by name
//!
//! # Architecture
//!
//! The core module defines dialect-agnostic abstractions. Target-specific SQL
//! syntax lives in `drivers/`, type reconciliation in `dialect/`, and the
//! synthesizers in `generate/` only talk to the `Dialect` trait.

pub mod catalog;
pub mod identifier;
pub mod schema;
pub mod traits;

pub use catalog::{normalize_dialect_name, DialectCatalog, DialectConstructor};
pub use schema::{
    ColumnDefinition, ForeignKeyDefinition, IndexDefinition, ProcedureDefinition,
    ProcedureParameter, SchemaAnalysisResult, TableDefinition, TriggerDefinition, ViewDefinition,
};
pub use traits::{Dialect, TextGenerator};
