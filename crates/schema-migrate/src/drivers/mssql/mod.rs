//! Microsoft SQL Server driver.
//!
//! - [`MssqlDialect`]: SQL syntax strategy for SQL Server targets

mod dialect;

pub use dialect::MssqlDialect;
