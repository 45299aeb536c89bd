//! Dialect type mapping with (source, target) pair keying.
//!
//! A [`TypeMapper`] maps a source column type string to a target type string
//! in three stages:
//!
//! 1. Exact lookup in a mapping table (skipped entirely for same-dialect
//!    migrations, which map every type to itself)
//! 2. Heuristic classification into a [`TypeFamily`](super::TypeFamily)
//! 3. The target's generic text type, with a warning naming the source type
//!
//! The mapping table comes from a static table when one ships for the dialect
//! pair. Otherwise it is requested once from the text generator, and a small
//! built-in table derived from the heuristics is used if that response cannot
//! be parsed.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::{normalize_dialect_name, Dialect, TextGenerator};
use crate::llm::extract_json_object;

use super::canonical::{classify, split_type, TypeFamily};

/// Where a mapper's table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    /// Same dialect on both sides; no table.
    Identity,
    /// Shipped with the library.
    Static,
    /// Parsed from a text generator response.
    Generated,
    /// Built-in fallback derived from the heuristics.
    BuiltinDefault,
}

/// Result of mapping a type from source to target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// Target type string (e.g., "varchar(255)", "bigint").
    pub target_type: String,
    /// Warning message when the type could not be mapped.
    pub warning: Option<String>,
}

impl TypeMapping {
    /// Create a mapping without a warning.
    pub fn exact(target_type: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            warning: None,
        }
    }

    /// Create a fallback mapping with a warning.
    pub fn fallback(target_type: impl Into<String>, warning: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            warning: Some(warning.into()),
        }
    }
}

/// MSSQL → PostgreSQL.
const MSSQL_TO_POSTGRES: &[(&str, &str)] = &[
    ("bit", "boolean"),
    ("tinyint", "smallint"),
    ("smallint", "smallint"),
    ("int", "integer"),
    ("bigint", "bigint"),
    ("decimal", "numeric"),
    ("numeric", "numeric"),
    ("money", "numeric(19,4)"),
    ("smallmoney", "numeric(10,4)"),
    ("float", "double precision"),
    ("real", "real"),
    ("char", "char"),
    ("nchar", "char"),
    ("varchar", "text"),
    ("nvarchar", "text"),
    ("varchar(max)", "text"),
    ("nvarchar(max)", "text"),
    ("text", "text"),
    ("ntext", "text"),
    ("binary", "bytea"),
    ("varbinary", "bytea"),
    ("varbinary(max)", "bytea"),
    ("image", "bytea"),
    ("date", "date"),
    ("time", "time"),
    ("datetime", "timestamp"),
    ("datetime2", "timestamp"),
    ("smalldatetime", "timestamp"),
    ("datetimeoffset", "timestamptz"),
    // SQL Server's timestamp is a row version, not a point in time.
    ("timestamp", "bytea"),
    ("rowversion", "bytea"),
    ("uniqueidentifier", "uuid"),
    ("xml", "xml"),
    ("sql_variant", "text"),
    ("hierarchyid", "text"),
    ("geometry", "text"),
    ("geography", "text"),
];

/// MySQL → PostgreSQL.
const MYSQL_TO_POSTGRES: &[(&str, &str)] = &[
    ("tinyint(1)", "boolean"),
    ("bit(1)", "boolean"),
    ("bool", "boolean"),
    ("boolean", "boolean"),
    ("tinyint", "smallint"),
    ("smallint", "smallint"),
    ("mediumint", "integer"),
    ("int", "integer"),
    ("integer", "integer"),
    ("bigint", "bigint"),
    ("float", "real"),
    ("double", "double precision"),
    ("decimal", "numeric"),
    ("datetime", "timestamp"),
    ("timestamp", "timestamp"),
    ("date", "date"),
    ("time", "time"),
    ("year", "smallint"),
    ("tinytext", "text"),
    ("text", "text"),
    ("mediumtext", "text"),
    ("longtext", "text"),
    ("tinyblob", "bytea"),
    ("blob", "bytea"),
    ("mediumblob", "bytea"),
    ("longblob", "bytea"),
    ("json", "jsonb"),
    ("enum", "text"),
    ("set", "text"),
];

/// Oracle → PostgreSQL.
const ORACLE_TO_POSTGRES: &[(&str, &str)] = &[
    ("number", "numeric"),
    ("varchar2", "text"),
    ("nvarchar2", "text"),
    ("char", "char"),
    ("nchar", "char"),
    ("clob", "text"),
    ("nclob", "text"),
    ("long", "text"),
    ("blob", "bytea"),
    ("raw", "bytea"),
    ("long raw", "bytea"),
    // Oracle DATE carries a time component.
    ("date", "timestamp"),
    ("timestamp", "timestamp"),
    ("timestamp with time zone", "timestamptz"),
    ("binary_float", "real"),
    ("binary_double", "double precision"),
    ("xmltype", "xml"),
];

/// PostgreSQL → MSSQL.
const POSTGRES_TO_MSSQL: &[(&str, &str)] = &[
    ("boolean", "bit"),
    ("bool", "bit"),
    ("smallint", "smallint"),
    ("integer", "int"),
    ("int", "int"),
    ("serial", "int"),
    ("bigint", "bigint"),
    ("bigserial", "bigint"),
    ("numeric", "decimal"),
    ("real", "real"),
    ("double precision", "float"),
    ("text", "nvarchar(max)"),
    ("varchar", "nvarchar(max)"),
    ("character varying", "nvarchar(max)"),
    ("bytea", "varbinary(max)"),
    ("date", "date"),
    ("time", "time"),
    ("timestamp", "datetime2"),
    ("timestamp without time zone", "datetime2"),
    ("timestamptz", "datetimeoffset"),
    ("timestamp with time zone", "datetimeoffset"),
    ("uuid", "uniqueidentifier"),
    ("json", "nvarchar(max)"),
    ("jsonb", "nvarchar(max)"),
    ("xml", "xml"),
];

/// PostgreSQL → MySQL.
const POSTGRES_TO_MYSQL: &[(&str, &str)] = &[
    ("boolean", "tinyint(1)"),
    ("bool", "tinyint(1)"),
    ("smallint", "smallint"),
    ("integer", "int"),
    ("serial", "int"),
    ("bigint", "bigint"),
    ("bigserial", "bigint"),
    ("numeric", "decimal(65,30)"),
    ("real", "float"),
    ("double precision", "double"),
    ("text", "longtext"),
    ("varchar", "longtext"),
    ("bytea", "longblob"),
    ("date", "date"),
    ("time", "time"),
    ("timestamp", "datetime(6)"),
    ("timestamptz", "datetime(6)"),
    ("timestamp with time zone", "datetime(6)"),
    ("uuid", "char(36)"),
    ("json", "json"),
    ("jsonb", "json"),
    ("xml", "longtext"),
];

/// MSSQL → MySQL.
const MSSQL_TO_MYSQL: &[(&str, &str)] = &[
    ("bit", "tinyint(1)"),
    ("tinyint", "tinyint unsigned"),
    ("int", "int"),
    ("money", "decimal(19,4)"),
    ("smallmoney", "decimal(10,4)"),
    ("float", "double"),
    ("nvarchar(max)", "longtext"),
    ("varchar(max)", "longtext"),
    ("ntext", "longtext"),
    ("text", "longtext"),
    ("varbinary(max)", "longblob"),
    ("image", "longblob"),
    ("datetime", "datetime"),
    ("datetime2", "datetime(6)"),
    ("smalldatetime", "datetime"),
    ("datetimeoffset", "datetime(6)"),
    ("timestamp", "binary(8)"),
    ("rowversion", "binary(8)"),
    ("uniqueidentifier", "char(36)"),
    ("xml", "longtext"),
];

/// Type names the built-in default table covers.
const GENERIC_TYPE_NAMES: &[&str] = &[
    "varchar", "nvarchar", "char", "nchar", "text", "ntext", "clob", "int", "integer", "bigint",
    "smallint", "tinyint", "decimal", "numeric", "money", "float", "double", "real", "boolean",
    "bool", "bit", "date", "time", "datetime", "datetime2", "timestamp", "timestamptz",
    "datetimeoffset", "binary", "varbinary", "blob", "bytea", "image", "json", "jsonb", "xml",
    "uuid", "uniqueidentifier",
];

/// Longest `varchar(n)` carried over before falling back to text.
const MAX_VARCHAR_LENGTH: u32 = 10_485_760;

/// Look up the static table for a dialect pair.
pub fn static_type_table(source: &str, target: &str) -> Option<HashMap<String, String>> {
    let entries = match (
        normalize_dialect_name(source).as_str(),
        normalize_dialect_name(target).as_str(),
    ) {
        ("mssql", "postgres") => MSSQL_TO_POSTGRES,
        ("mysql", "postgres") => MYSQL_TO_POSTGRES,
        ("oracle", "postgres") => ORACLE_TO_POSTGRES,
        ("postgres", "mssql") => POSTGRES_TO_MSSQL,
        ("postgres", "mysql") => POSTGRES_TO_MYSQL,
        ("mssql", "mysql") => MSSQL_TO_MYSQL,
        _ => return None,
    };
    Some(
        entries
            .iter()
            .map(|(s, t)| (s.to_string(), t.to_string()))
            .collect(),
    )
}

/// Build the built-in default table for a target dialect.
pub fn default_type_table(target: &dyn Dialect) -> HashMap<String, String> {
    GENERIC_TYPE_NAMES
        .iter()
        .filter_map(|name| {
            classify(name).map(|family| (name.to_string(), render_family(target, family, None)))
        })
        .collect()
}

/// Prompt asking the text generator for a mapping table.
pub fn type_table_prompt(source: &str, target: &dyn Dialect) -> String {
    format!(
        "You are a database migration expert. Produce a JSON object that maps {source} column \
         data types to their closest {target} equivalents.\n\
         Keys are lowercase {source} type names without length or precision arguments; values \
         are {target} type names.\n\
         Cover string, integer, decimal, floating point, boolean, date/time, binary, JSON, XML \
         and UUID types.\n\
         Respond with the JSON object only.",
        source = source,
        target = target.name()
    )
}

/// Parse a mapping table out of a text generator response.
///
/// Accepts a flat object or one nested under a `"mappings"` key. Non-string
/// values are ignored. Returns `None` when nothing usable is found.
pub fn parse_type_table(response: &str) -> Option<HashMap<String, String>> {
    let value = extract_json_object(response)?;
    let object = match value.get("mappings") {
        Some(serde_json::Value::Object(inner)) => inner.clone(),
        _ => value.as_object()?.clone(),
    };

    let table: HashMap<String, String> = object
        .into_iter()
        .filter_map(|(k, v)| {
            let target = v.as_str()?.trim();
            if k.trim().is_empty() || target.is_empty() {
                return None;
            }
            Some((normalize_key(&k), target.to_string()))
        })
        .collect();

    if table.is_empty() {
        None
    } else {
        Some(table)
    }
}

fn normalize_key(source_type: &str) -> String {
    source_type
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Render a family in the target dialect, carrying arguments where they apply.
fn render_family(target: &dyn Dialect, family: TypeFamily, args: Option<&str>) -> String {
    match (family, args) {
        (TypeFamily::Varchar, None) => target.type_name(TypeFamily::Text).to_string(),
        (TypeFamily::Varchar | TypeFamily::Char, Some(a)) => match a.parse::<u32>() {
            Ok(n) if n > 0 && n <= MAX_VARCHAR_LENGTH => target.sized_type(family, a),
            _ => target.type_name(TypeFamily::Text).to_string(),
        },
        (TypeFamily::Decimal, Some(a)) => target.sized_type(family, a),
        _ => target.type_name(family).to_string(),
    }
}

/// Maps source column types to target column types.
pub struct TypeMapper {
    source_dialect: String,
    target: Arc<dyn Dialect>,
    table: HashMap<String, String>,
    table_source: TableSource,
}

impl TypeMapper {
    /// Create a mapper with an explicit table.
    pub fn new(
        source_dialect: &str,
        target: Arc<dyn Dialect>,
        table: HashMap<String, String>,
        table_source: TableSource,
    ) -> Self {
        Self {
            source_dialect: normalize_dialect_name(source_dialect),
            target,
            table: table
                .into_iter()
                .map(|(k, v)| (normalize_key(&k), v))
                .collect(),
            table_source,
        }
    }

    /// Create a pass-through mapper for same-dialect migrations.
    pub fn identity(target: Arc<dyn Dialect>) -> Self {
        let source = target.name().to_string();
        Self::new(&source, target, HashMap::new(), TableSource::Identity)
    }

    /// Create a mapper from the identity rule or a static table, if either applies.
    pub fn for_pair(source_dialect: &str, target: Arc<dyn Dialect>) -> Option<Self> {
        let source = normalize_dialect_name(source_dialect);
        if source == target.name() {
            return Some(Self::identity(target));
        }
        let table = static_type_table(&source, target.name())?;
        Some(Self::new(&source, target, table, TableSource::Static))
    }

    /// Create a mapper with the built-in default table.
    pub fn with_default_table(source_dialect: &str, target: Arc<dyn Dialect>) -> Self {
        let table = default_type_table(target.as_ref());
        Self::new(source_dialect, target, table, TableSource::BuiltinDefault)
    }

    /// Build the mapper for a run, asking the generator only when no
    /// identity rule or static table applies.
    ///
    /// Never fails: an error or unparseable response falls back to the
    /// built-in default table.
    pub async fn bootstrap(
        source_dialect: &str,
        target: Arc<dyn Dialect>,
        generator: &dyn TextGenerator,
    ) -> Self {
        if let Some(mapper) = Self::for_pair(source_dialect, target.clone()) {
            return mapper;
        }

        let source = normalize_dialect_name(source_dialect);
        info!(
            "No static type table for {} → {}; requesting one from {}",
            source,
            target.name(),
            generator.name()
        );
        let prompt = type_table_prompt(&source, target.as_ref());
        match generator.generate_text(&prompt).await {
            Ok(response) => match parse_type_table(&response) {
                Some(table) => {
                    info!("Loaded {} generated type mappings", table.len());
                    Self::new(&source, target, table, TableSource::Generated)
                }
                None => {
                    warn!("Type table response was not a JSON object; using built-in defaults");
                    Self::with_default_table(&source, target)
                }
            },
            Err(e) => {
                warn!("Type table request failed ({}); using built-in defaults", e);
                Self::with_default_table(&source, target)
            }
        }
    }

    pub fn source_dialect(&self) -> &str {
        &self.source_dialect
    }

    pub fn target_dialect(&self) -> &str {
        self.target.name()
    }

    pub fn table_source(&self) -> TableSource {
        self.table_source
    }

    /// Check if this mapper passes types through unchanged.
    pub fn is_identity(&self) -> bool {
        self.table_source == TableSource::Identity
    }

    /// Map a source type string to a target type string.
    pub fn map_type(&self, source_type: &str) -> TypeMapping {
        if self.is_identity() {
            return TypeMapping::exact(source_type.trim());
        }

        if let Some(target) = self.table.get(&normalize_key(source_type)) {
            return TypeMapping::exact(target.clone());
        }

        let (_, args) = split_type(source_type);
        match classify(source_type) {
            Some(family) => {
                TypeMapping::exact(render_family(self.target.as_ref(), family, args.as_deref()))
            }
            None => {
                let fallback = self.target.type_name(TypeFamily::Text);
                TypeMapping::fallback(
                    fallback,
                    format!(
                        "Unmapped source type '{}' ({} → {}); defaulting to {}",
                        source_type.trim(),
                        self.source_dialect,
                        self.target.name(),
                        fallback
                    ),
                )
            }
        }
    }

    /// Family of the mapped target type, if it can be classified.
    pub fn target_family(&self, source_type: &str) -> Option<TypeFamily> {
        classify(&self.map_type(source_type).target_type)
    }
}
