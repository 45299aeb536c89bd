//! PostgreSQL driver.
//!
//! - [`PostgresDialect`]: SQL syntax strategy for PostgreSQL targets

mod dialect;

pub use dialect::PostgresDialect;
