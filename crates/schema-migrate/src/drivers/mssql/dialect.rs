//! MSSQL SQL dialect (Strategy pattern).
//!
//! Provides MSSQL-specific syntax for identifier quoting, type names,
//! identity columns, sequences, extended-property comments and index options.

use crate::core::identifier::{quote_mssql, split_qualified};
use crate::core::traits::Dialect;
use crate::dialect::TypeFamily;

/// Microsoft SQL Server dialect implementation.
///
/// Implements the Strategy pattern for SQL syntax differences.
#[derive(Debug, Clone, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Create a new MSSQL dialect instance.
    pub fn new() -> Self {
        Self
    }

    /// Unicode string literal (`N'...'`).
    fn nstring(&self, value: &str) -> String {
        format!("N{}", self.string_literal(value))
    }

    /// `(schema, table)` with the schema defaulted to `dbo`.
    fn schema_and_table<'a>(&self, table: &'a str) -> (&'a str, &'a str) {
        let (schema, name) = split_qualified(table);
        (schema.unwrap_or("dbo"), name)
    }
}

impl Dialect for MssqlDialect {
    fn name(&self) -> &str {
        "mssql"
    }

    fn default_schema(&self) -> Option<&str> {
        Some("dbo")
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_mssql(name)
    }

    fn type_name(&self, family: TypeFamily) -> &'static str {
        match family {
            TypeFamily::Varchar => "nvarchar",
            TypeFamily::Char => "nchar",
            TypeFamily::Text | TypeFamily::Json => "nvarchar(max)",
            TypeFamily::BigInt => "bigint",
            TypeFamily::SmallInt => "smallint",
            TypeFamily::TinyInt => "tinyint",
            TypeFamily::Integer => "int",
            TypeFamily::Decimal => "decimal",
            TypeFamily::Float => "real",
            TypeFamily::Double => "float",
            TypeFamily::Boolean => "bit",
            TypeFamily::Date => "date",
            TypeFamily::Time => "time",
            TypeFamily::Timestamp => "datetime2",
            TypeFamily::TimestampTz => "datetimeoffset",
            TypeFamily::Binary => "varbinary(max)",
            TypeFamily::Xml => "xml",
            TypeFamily::Uuid => "uniqueidentifier",
        }
    }

    fn current_timestamp(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }

    fn uuid_function(&self) -> &'static str {
        "NEWID()"
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn supports_national_literals(&self) -> bool {
        true
    }

    fn create_schema(&self, schema: &str) -> String {
        // CREATE SCHEMA must be the only statement in its batch.
        format!(
            "IF NOT EXISTS (SELECT 1 FROM sys.schemas WHERE name = {}) EXEC('CREATE SCHEMA {}')",
            self.nstring(schema),
            self.quote_ident(schema).replace('\'', "''")
        )
    }

    fn identity_clause(&self) -> &'static str {
        "IDENTITY(1,1)"
    }

    fn create_sequence(&self, qualified: &str) -> Option<String> {
        Some(format!(
            "CREATE SEQUENCE {} START WITH 1 INCREMENT BY 1",
            self.qualify(qualified)
        ))
    }

    fn sequence_default(&self, qualified: &str) -> Option<String> {
        Some(format!("NEXT VALUE FOR {}", self.qualify(qualified)))
    }

    fn comment_on_table(&self, table: &str, text: &str) -> String {
        let (schema, name) = self.schema_and_table(table);
        format!(
            "EXEC sp_addextendedproperty @name = N'MS_Description', @value = {}, \
             @level0type = N'SCHEMA', @level0name = {}, @level1type = N'TABLE', @level1name = {}",
            self.nstring(text),
            self.nstring(schema),
            self.nstring(name)
        )
    }

    fn comment_on_column(&self, table: &str, column: &str, text: &str) -> String {
        let (schema, name) = self.schema_and_table(table);
        format!(
            "EXEC sp_addextendedproperty @name = N'MS_Description', @value = {}, \
             @level0type = N'SCHEMA', @level0name = {}, @level1type = N'TABLE', @level1name = {}, \
             @level2type = N'COLUMN', @level2name = {}",
            self.nstring(text),
            self.nstring(schema),
            self.nstring(name),
            self.nstring(column)
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
        let placement = match index_type.map(str::to_lowercase).as_deref() {
            Some("clustered") => "CLUSTERED ",
            Some("nonclustered") => "NONCLUSTERED ",
            _ => "",
        };
        let cols: Vec<String> = columns.iter().map(|c| self.ident(c)).collect();
        let (_, bare_name) = split_qualified(name);
        format!(
            "CREATE {}{}INDEX {} ON {} ({})",
            unique,
            placement,
            self.ident(bare_name),
            self.qualify(table),
            cols.join(", ")
        )
    }

    fn procedural_language(&self) -> &'static str {
        "T-SQL"
    }

    fn trigger_guidance(&self) -> &'static str {
        "SQL Server triggers are statement-level. Use CREATE OR ALTER TRIGGER ... ON <table> \
         AFTER|INSTEAD OF <events> AS BEGIN ... END and read row values from the inserted and \
         deleted pseudo-tables instead of NEW and OLD."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.quote_ident("name"), "[name]");
        assert_eq!(dialect.quote_ident("table]name"), "[table]]name]");
        assert_eq!(dialect.quote_ident("Users"), "[Users]");
    }

    #[test]
    fn test_type_names() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.sized_type(TypeFamily::Varchar, "40"), "nvarchar(40)");
        assert_eq!(dialect.type_name(TypeFamily::Timestamp), "datetime2");
        assert_eq!(dialect.type_name(TypeFamily::Boolean), "bit");
        assert_eq!(dialect.type_name(TypeFamily::Uuid), "uniqueidentifier");
    }

    #[test]
    fn test_create_schema_guarded() {
        let dialect = MssqlDialect::new();
        assert_eq!(
            dialect.create_schema("sales"),
            "IF NOT EXISTS (SELECT 1 FROM sys.schemas WHERE name = N'sales') EXEC('CREATE SCHEMA [sales]')"
        );
    }

    #[test]
    fn test_sequences() {
        let dialect = MssqlDialect::new();
        assert_eq!(
            dialect.sequence_default("dbo.orders_code_seq").unwrap(),
            "NEXT VALUE FOR dbo.orders_code_seq"
        );
        assert!(dialect
            .create_sequence("dbo.orders_code_seq")
            .unwrap()
            .starts_with("CREATE SEQUENCE dbo.orders_code_seq"));
    }

    #[test]
    fn test_comment_defaults_schema() {
        let dialect = MssqlDialect::new();
        let sql = dialect.comment_on_column("orders", "Total", "Migrated");
        assert!(sql.contains("@level0name = N'dbo'"));
        assert!(sql.contains("@level1name = N'orders'"));
        assert!(sql.contains("@level2name = N'Total'"));
    }

    #[test]
    fn test_create_index_placement() {
        let dialect = MssqlDialect::new();
        let cols = vec!["CustomerId".to_string()];
        assert_eq!(
            dialect.create_index("idx_orders_customer", "sales.orders", &cols, false, Some("NONCLUSTERED")),
            "CREATE NONCLUSTERED INDEX idx_orders_customer ON sales.orders ([CustomerId])"
        );
        assert_eq!(
            dialect.create_index("idx_orders_customer", "orders", &cols, true, Some("gin")),
            "CREATE UNIQUE INDEX idx_orders_customer ON orders ([CustomerId])"
        );
    }
}
