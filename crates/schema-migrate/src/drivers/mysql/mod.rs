//! MySQL/MariaDB driver.
//!
//! - [`MysqlDialect`]: SQL syntax strategy for MySQL targets

mod dialect;

pub use dialect::MysqlDialect;
