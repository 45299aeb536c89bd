//! Target dialect implementations.
//!
//! This module provides database-specific implementations of the
//! [`Dialect`](crate::core::Dialect) trait:
//!
//! - [`mssql`]: Microsoft SQL Server
//! - [`postgres`]: PostgreSQL
//! - [`mysql`]: MySQL/MariaDB
//!
//! # Adding New Databases
//!
//! To add support for a new target database:
//!
//! 1. Create a new module under `drivers/` (e.g., `drivers/oracle/`)
//! 2. Implement the `Dialect` trait
//! 3. Register a constructor in `DialectCatalog::with_builtins()`
//! 4. Add a static type table for the common source pairs in `dialect::typemap`

pub mod mssql;
pub mod mysql;
pub mod postgres;

pub use mssql::MssqlDialect;
pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;
