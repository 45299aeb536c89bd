//! MySQL/MariaDB SQL dialect (Strategy pattern).
//!
//! MySQL has no schemas separate from databases and no sequences, so schema
//! creation maps to `CREATE DATABASE` and sequence hooks return `None`.

use crate::core::identifier::{quote_mysql, split_qualified};
use crate::core::traits::Dialect;
use crate::dialect::TypeFamily;
use crate::generate::comment_text;

/// MySQL/MariaDB dialect implementation.
///
/// Compatible with MySQL 5.7+, 8.0+, and MariaDB 10.2+.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn default_schema(&self) -> Option<&str> {
        None
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_mysql(name)
    }

    fn type_name(&self, family: TypeFamily) -> &'static str {
        match family {
            TypeFamily::Varchar => "varchar",
            TypeFamily::Char => "char",
            TypeFamily::Text | TypeFamily::Xml => "longtext",
            TypeFamily::BigInt => "bigint",
            TypeFamily::SmallInt => "smallint",
            TypeFamily::TinyInt => "tinyint",
            TypeFamily::Integer => "int",
            TypeFamily::Decimal => "decimal",
            TypeFamily::Float => "float",
            TypeFamily::Double => "double",
            TypeFamily::Boolean => "tinyint(1)",
            TypeFamily::Date => "date",
            TypeFamily::Time => "time",
            TypeFamily::Timestamp => "datetime",
            TypeFamily::TimestampTz => "timestamp",
            TypeFamily::Binary => "longblob",
            TypeFamily::Json => "json",
            TypeFamily::Uuid => "char(36)",
        }
    }

    fn current_timestamp(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }

    fn uuid_function(&self) -> &'static str {
        // Expression defaults need parentheses (8.0.13+).
        "(UUID())"
    }

    fn create_schema(&self, schema: &str) -> String {
        format!("CREATE DATABASE IF NOT EXISTS {}", self.ident(schema))
    }

    fn identity_clause(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    fn create_sequence(&self, _qualified: &str) -> Option<String> {
        None
    }

    fn sequence_default(&self, _qualified: &str) -> Option<String> {
        None
    }

    fn comment_on_table(&self, table: &str, text: &str) -> String {
        format!(
            "ALTER TABLE {} COMMENT = {}",
            self.qualify(table),
            self.string_literal(text)
        )
    }

    fn comment_on_column(&self, table: &str, column: &str, text: &str) -> String {
        // Column comments require restating the full definition in MySQL.
        let note = format!("{}.{}: {}", self.qualify(table), self.ident(column), text);
        format!("-- {}", comment_text(&note))
    }

    fn create_index(
        &self,
        name: &str,
        table: &str,
        columns: &[String],
        unique: bool,
        index_type: Option<&str>,
    ) -> String {
        let method = index_type.map(str::to_lowercase);
        let kind = match method.as_deref() {
            Some("fulltext") => "FULLTEXT ",
            Some("spatial") => "SPATIAL ",
            _ if unique => "UNIQUE ",
            _ => "",
        };
        let using = match method.as_deref() {
            Some("hash") => " USING HASH",
            Some("btree") => " USING BTREE",
            _ => "",
        };
        let cols: Vec<String> = columns.iter().map(|c| self.ident(c)).collect();
        let (_, bare_name) = split_qualified(name);
        format!(
            "CREATE {}INDEX {} ON {} ({}){}",
            kind,
            self.ident(bare_name),
            self.qualify(table),
            cols.join(", "),
            using
        )
    }

    fn procedural_language(&self) -> &'static str {
        "MySQL stored program language"
    }

    fn trigger_guidance(&self) -> &'static str {
        "MySQL triggers are row-level and fire for exactly one event. Emit one \
         CREATE TRIGGER <name> BEFORE|AFTER INSERT|UPDATE|DELETE ON <table> FOR EACH ROW \
         BEGIN ... END per event, using NEW and OLD for row values. Do not emit DELIMITER lines."
    }
}
