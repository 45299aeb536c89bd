//! Identifier validation, quoting and qualified-name handling.
//!
//! Plans refer to tables, views and routines by qualified strings
//! (`schema.name`, or `name` when the source has no schemas). This module is
//! the single place that builds, splits and compares those strings, and that
//! decides how an identifier is written into generated SQL.
//!
//! # Quoting
//!
//! Identifiers that are plain lowercase words and not reserved are emitted
//! bare, which keeps generated scripts readable. Everything else is quoted
//! with the target dialect's quote style, escaping the closing quote
//! character by doubling it.

use crate::error::{MigrateError, Result};

/// Maximum identifier length (conservative limit across databases).
/// - PostgreSQL: 63 bytes
/// - SQL Server: 128 characters
/// - MySQL: 64 characters
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Words that must always be quoted when used as identifiers.
const RESERVED_WORDS: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "check", "column", "constraint",
    "create", "default", "delete", "desc", "distinct", "drop", "else", "end", "exists",
    "foreign", "from", "grant", "group", "having", "in", "index", "insert", "into", "is",
    "join", "key", "like", "limit", "not", "null", "offset", "on", "or", "order", "primary",
    "references", "select", "set", "table", "then", "to", "union", "unique", "update", "user",
    "using", "values", "when", "where", "with",
];

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers containing other control characters such as line breaks
/// - Identifiers exceeding maximum length
///
/// # Errors
///
/// Returns `MigrateError::Plan` for invalid identifiers with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(MigrateError::plan("Identifier cannot be empty"));
    }

    if name.contains('\0') {
        return Err(MigrateError::plan(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.chars().any(char::is_control) {
        return Err(MigrateError::plan(format!(
            "SECURITY: Identifier contains control characters: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::plan(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Check whether an identifier can be emitted without quotes.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_lowercase() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return false;
    }
    !RESERVED_WORDS.contains(&name)
}

/// Quote a PostgreSQL identifier.
///
/// ```ignore
/// assert_eq!(quote_pg("Order Lines"), "\"Order Lines\"");
/// ```
pub fn quote_pg(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a MySQL identifier using backticks.
pub fn quote_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a SQL Server identifier using brackets.
pub fn quote_mssql(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Build a qualified name from an optional schema and an object name.
pub fn qualified_name(schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(s) if !s.is_empty() => format!("{}.{}", s, name),
        _ => name.to_string(),
    }
}

/// Split a qualified name into `(schema, name)`.
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('.') {
        Some((schema, object)) if !schema.is_empty() => (Some(schema), object),
        _ => (None, name),
    }
}

/// Compare two qualified names.
///
/// Names match ignoring ASCII case. When either side has no schema, only the
/// object names are compared.
pub fn same_object(a: &str, b: &str) -> bool {
    if a.eq_ignore_ascii_case(b) {
        return true;
    }
    let (schema_a, name_a) = split_qualified(a);
    let (schema_b, name_b) = split_qualified(b);
    match (schema_a, schema_b) {
        (Some(sa), Some(sb)) => sa.eq_ignore_ascii_case(sb) && name_a.eq_ignore_ascii_case(name_b),
        _ => name_a.eq_ignore_ascii_case(name_b),
    }
}

/// Reduce an identifier to characters safe for use inside a synthesized name.
pub fn name_fragment(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
