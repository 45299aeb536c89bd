//! PostgreSQL SQL dialect (Strategy pattern).
//!
//! Provides PostgreSQL-specific syntax for identifier quoting, type names,
//! identity columns, sequences, comments and index access methods.

use crate::core::identifier::{quote_pg, split_qualified};
use crate::core::traits::Dialect;
use crate::dialect::TypeFamily;

/// Index access methods PostgreSQL understands.
const INDEX_METHODS: &[&str] = &["hash", "gist", "gin", "spgist", "brin"];

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn default_schema(&self) -> Option<&str> {
        Some("public")
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_pg(name)
    }

    fn type_name(&self, family: TypeFamily) -> &'static str {
        match family {
            TypeFamily::Varchar => "varchar",
            TypeFamily::Char => "char",
            TypeFamily::Text => "text",
            TypeFamily::BigInt => "bigint",
            // No 8-bit integer in PostgreSQL.
            TypeFamily::SmallInt | TypeFamily::TinyInt => "smallint",
            TypeFamily::Integer => "integer",
            TypeFamily::Decimal => "numeric",
            TypeFamily::Float => "real",
            TypeFamily::Double => "double precision",
            TypeFamily::Boolean => "boolean",
            TypeFamily::Date => "date",
            TypeFamily::Time => "time",
            TypeFamily::Timestamp => "timestamp",
            TypeFamily::TimestampTz => "timestamptz",
            TypeFamily::Binary => "bytea",
            TypeFamily::Json => "jsonb",
            TypeFamily::Xml => "xml",
            TypeFamily::Uuid => "uuid",
        }
    }

    fn current_timestamp(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }

    fn uuid_function(&self) -> &'static str {
        "gen_random_uuid()"
    }

    fn create_schema(&self, schema: &str) -> String {
        format!("CREATE SCHEMA IF NOT EXISTS {}", self.ident(schema))
    }

    fn identity_clause(&self) -> &'static str {
        "GENERATED ALWAYS AS IDENTITY"
    }

    fn create_sequence(&self, qualified: &str) -> Option<String> {
        Some(format!("CREATE SEQUENCE IF NOT EXISTS {}", self.qualify(qualified)))
    }

    fn sequence_default(&self, qualified: &str) -> Option<String> {
        Some(format!(
            "nextval({})",
            self.string_literal(&self.qualify(qualified))
        ))
    }

    fn comment_on_table(&self, table: &str, text: &str) -> String {
        format!(
            "COMMENT ON TABLE {} IS {}",
            self.qualify(table),
            self.string_literal(text)
        )
    }

    fn comment_on_column(&self, table: &str, column: &str, text: &str) -> String {
        format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            self.qualify(table),
            self.ident(column),
            self.string_literal(text)
        )
    }

    fn create_index(
        &self,
        name: &str,
        table: &str,
        columns: &[String],
        unique: bool,
        index_type: Option<&str>,
    ) -> String {
        let unique = if unique { "UNIQUE " } else { "" };
        let method = index_type
            .map(str::to_lowercase)
            .filter(|m| INDEX_METHODS.contains(&m.as_str()))
            .map(|m| format!(" USING {}", m))
            .unwrap_or_default();
        let cols: Vec<String> = columns.iter().map(|c| self.ident(c)).collect();

        // Index names are schema-local in PostgreSQL; never qualify them.
        let (_, bare_name) = split_qualified(name);
        format!(
            "CREATE {}INDEX {} ON {}{} ({})",
            unique,
            self.ident(bare_name),
            self.qualify(table),
            method,
            cols.join(", ")
        )
    }

    fn procedural_language(&self) -> &'static str {
        "PL/pgSQL"
    }

    fn trigger_guidance(&self) -> &'static str {
        "PostgreSQL triggers execute a trigger function. Return both statements: first \
         CREATE OR REPLACE FUNCTION <name>() RETURNS trigger LANGUAGE plpgsql AS $$ ... $$; \
         then CREATE TRIGGER ... EXECUTE FUNCTION <name>(). Use NEW and OLD for row values."
    }
}
