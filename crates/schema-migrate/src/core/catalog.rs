//! Dialect catalog for explicit dependency injection.
//!
//! The [`DialectCatalog`] maps a target dialect name to a constructor. It is
//! explicitly constructed and handed to the [`SchemaConverter`](crate::SchemaConverter)
//! builder rather than living in global state, so tests can register their
//! own dialects and initialization order stays deterministic.

use std::collections::HashMap;
use std::sync::Arc;

use crate::drivers::{MssqlDialect, MysqlDialect, PostgresDialect};
use crate::error::{MigrateError, Result};

use super::traits::Dialect;

/// Constructor for a dialect strategy.
pub type DialectConstructor = fn() -> Arc<dyn Dialect>;

/// Normalize a dialect tag, resolving common aliases.
///
/// Works for source tags too, including engines that have no target dialect.
pub fn normalize_dialect_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.as_str() {
        "postgres" | "postgresql" | "pg" => "postgres".to_string(),
        "mssql" | "sqlserver" | "sql_server" | "sql server" => "mssql".to_string(),
        "mysql" | "mariadb" => "mysql".to_string(),
        "oracle" | "oracledb" => "oracle".to_string(),
        "sqlite" | "sqlite3" => "sqlite".to_string(),
        _ => lower,
    }
}

/// Registry of target dialects.
///
/// # Example
///
/// ```rust,ignore
/// let catalog = DialectCatalog::with_builtins();
/// let dialect = catalog.create("postgresql")?;
/// assert_eq!(dialect.name(), "postgres");
/// ```
#[derive(Default)]
pub struct DialectCatalog {
    constructors: HashMap<String, DialectConstructor>,
}

impl DialectCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with PostgreSQL, SQL Server and MySQL registered.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register("postgres", || Arc::new(PostgresDialect::new()));
        catalog.register("mssql", || Arc::new(MssqlDialect::new()));
        catalog.register("mysql", || Arc::new(MysqlDialect::new()));
        catalog
    }

    /// Register a dialect constructor by name.
    pub fn register(&mut self, name: impl AsRef<str>, constructor: DialectConstructor) {
        self.constructors
            .insert(normalize_dialect_name(name.as_ref()), constructor);
    }

    /// Construct the dialect registered under `name` (aliases accepted).
    pub fn create(&self, name: &str) -> Result<Arc<dyn Dialect>> {
        self.constructors
            .get(&normalize_dialect_name(name))
            .map(|ctor| ctor())
            .ok_or_else(|| MigrateError::UnknownDialect(name.to_string()))
    }

    /// Check if a dialect is registered.
    pub fn has_dialect(&self, name: &str) -> bool {
        self.constructors
            .contains_key(&normalize_dialect_name(name))
    }

    /// Get all registered dialect names, sorted.
    pub fn dialect_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize_dialect_name("PostgreSQL"), "postgres");
        assert_eq!(normalize_dialect_name("pg"), "postgres");
        assert_eq!(normalize_dialect_name("SqlServer"), "mssql");
        assert_eq!(normalize_dialect_name("MariaDB"), "mysql");
        assert_eq!(normalize_dialect_name(" oracle "), "oracle");
        assert_eq!(normalize_dialect_name("db2"), "db2");
    }

    #[test]
    fn test_builtins() {
        let catalog = DialectCatalog::with_builtins();
        assert_eq!(catalog.dialect_names(), vec!["mssql", "mysql", "postgres"]);
        assert_eq!(catalog.create("postgresql").unwrap().name(), "postgres");
        assert_eq!(catalog.create("sql_server").unwrap().name(), "mssql");
        assert!(catalog.has_dialect("mariadb"));
    }

    #[test]
    fn test_unknown_dialect() {
        let catalog = DialectCatalog::with_builtins();
        let err = catalog.create("db2").err().unwrap();
        assert!(matches!(err, MigrateError::UnknownDialect(ref name) if name == "db2"));
    }

    #[test]
    fn test_custom_registration() {
        let mut catalog = DialectCatalog::new();
        assert!(!catalog.has_dialect("postgres"));
        catalog.register("PG", || Arc::new(PostgresDialect::new()));
        assert!(catalog.has_dialect("postgres"));
    }
}
