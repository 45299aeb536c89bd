//! Core traits for dialect-aware migration generation.
//!
//! This module defines the two seams of the engine:
//!
//! - [`Dialect`]: SQL syntax strategy for a target database engine
//! - [`TextGenerator`]: the generative backend, an opaque prompt → text capability
//!
//! # Design Patterns
//!
//! - **Strategy**: one `Dialect` implementation per target engine, selected by
//!   name through the [`DialectCatalog`](super::catalog::DialectCatalog)
//! - **Template Method**: default methods build on a handful of required
//!   primitives (quoting, type names)

use async_trait::async_trait;

use crate::dialect::TypeFamily;
use crate::error::Result;

use super::identifier::{is_plain_identifier, split_qualified};

/// SQL syntax strategy for a target database engine.
///
/// All methods take raw (unquoted) names; implementations decide how to quote
/// and qualify them. Returned statements carry no trailing semicolon.
pub trait Dialect: Send + Sync {
    /// Get the dialect identifier (e.g., "postgres", "mssql").
    fn name(&self) -> &str;

    /// Schema that needs no `CREATE SCHEMA` (e.g., "public", "dbo").
    fn default_schema(&self) -> Option<&str>;

    /// Quote an identifier unconditionally.
    ///
    /// - MSSQL: `[identifier]`
    /// - PostgreSQL: `"identifier"`
    /// - MySQL: `` `identifier` ``
    fn quote_ident(&self, name: &str) -> String;

    /// Render an identifier, quoting only when required.
    fn ident(&self, name: &str) -> String {
        if is_plain_identifier(name) {
            name.to_string()
        } else {
            self.quote_ident(name)
        }
    }

    /// Render a qualified `schema.name` string.
    fn qualify(&self, qualified: &str) -> String {
        match split_qualified(qualified) {
            (Some(schema), name) => format!("{}.{}", self.ident(schema), self.ident(name)),
            (None, name) => self.ident(name),
        }
    }

    /// Check whether a schema is the dialect's default schema.
    fn is_default_schema(&self, schema: &str) -> bool {
        self.default_schema()
            .is_some_and(|d| d.eq_ignore_ascii_case(schema))
    }

    /// Target type name for a type family.
    fn type_name(&self, family: TypeFamily) -> &'static str;

    /// Target type with length/precision arguments carried over.
    ///
    /// `args` is the raw text between the parentheses of the source type.
    fn sized_type(&self, family: TypeFamily, args: &str) -> String {
        let base = self.type_name(family);
        match family {
            TypeFamily::Varchar | TypeFamily::Char | TypeFamily::Decimal => {
                format!("{}({})", base, args)
            }
            _ => base.to_string(),
        }
    }

    /// Token for the current timestamp (e.g., `CURRENT_TIMESTAMP`).
    fn current_timestamp(&self) -> &'static str;

    /// Expression that generates a random UUID.
    fn uuid_function(&self) -> &'static str;

    /// Render a string literal, escaping embedded single quotes.
    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Boolean literal (`TRUE`/`FALSE`, or `1`/`0` where booleans are bits).
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    /// Whether `N'...'` unicode string literals are understood.
    fn supports_national_literals(&self) -> bool {
        false
    }

    /// Statement creating a schema if it does not exist.
    fn create_schema(&self, schema: &str) -> String;

    /// Column clause for integer identity columns.
    fn identity_clause(&self) -> &'static str;

    /// Statement creating a sequence, if the dialect has sequences.
    fn create_sequence(&self, qualified: &str) -> Option<String>;

    /// Default expression drawing from a sequence, if the dialect has sequences.
    fn sequence_default(&self, qualified: &str) -> Option<String>;

    /// Provenance annotation for a table.
    fn comment_on_table(&self, table: &str, text: &str) -> String;

    /// Provenance annotation for a column.
    fn comment_on_column(&self, table: &str, column: &str, text: &str) -> String;

    /// Statement creating an index.
    fn create_index(
        &self,
        name: &str,
        table: &str,
        columns: &[String],
        unique: bool,
        index_type: Option<&str>,
    ) -> String;

    /// Procedural language hint used in conversion prompts.
    fn procedural_language(&self) -> &'static str;

    /// Extra instructions for trigger conversion prompts.
    fn trigger_guidance(&self) -> &'static str;
}

/// The generative backend.
///
/// The engine depends on nothing beyond "returns text for a prompt". Every
/// caller owns its own validation and fallback policy; an `Err` here is never
/// propagated out of the engine.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt.
    async fn generate_text(&self, prompt: &str) -> Result<String>;

    /// Short name for logging.
    fn name(&self) -> &str {
        "generator"
    }
}
