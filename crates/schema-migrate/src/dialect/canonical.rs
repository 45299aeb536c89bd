//! Type families and the heuristic classifier.
//!
//! When a source type has no exact entry in the mapping table, it is
//! classified into a [`TypeFamily`] by substring rules, and the target
//! [`Dialect`](crate::core::Dialect) names its type for that family.
//!
//! ```text
//! Source type   →  TypeFamily  →  Target type
//!  nvarchar(50) →   Varchar    →  varchar(50)
//!  datetime2    →   Timestamp  →  timestamp
//! ```
//!
//! The rules run in a fixed priority order: string/char, integer,
//! decimal/numeric, float/double, boolean, date/time, binary, json, xml, uuid.

/// Dialect-independent type family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    // ===== String Types =====
    /// Variable-length character string.
    Varchar,
    /// Fixed-length character string.
    Char,
    /// Unlimited text.
    Text,

    // ===== Integer Types =====
    BigInt,
    SmallInt,
    /// 8-bit integer. Targets without one widen to SmallInt.
    TinyInt,
    Integer,

    // ===== Numeric Types =====
    /// Exact decimal.
    Decimal,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,

    Boolean,

    // ===== Date/Time Types =====
    Date,
    Time,
    /// Date and time without timezone.
    Timestamp,
    /// Date and time with timezone.
    TimestampTz,

    // ===== Special Types =====
    Binary,
    Json,
    Xml,
    Uuid,
}

impl TypeFamily {
    /// Check if the family is an integer type.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeFamily::BigInt | TypeFamily::SmallInt | TypeFamily::TinyInt | TypeFamily::Integer
        )
    }

    /// Check if the family carries length or precision arguments.
    pub fn takes_args(self) -> bool {
        matches!(
            self,
            TypeFamily::Varchar | TypeFamily::Char | TypeFamily::Decimal
        )
    }
}

/// Split a type string into its lowercase base name and raw arguments.
///
/// `"NVARCHAR(50)"` becomes `("nvarchar", Some("50"))`.
pub fn split_type(source_type: &str) -> (String, Option<String>) {
    let trimmed = source_type.trim();
    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(open), Some(close)) if close > open => {
            let base = format!("{}{}", &trimmed[..open], &trimmed[close + 1..]);
            let args = trimmed[open + 1..close].replace(' ', "");
            let args = if args.is_empty() { None } else { Some(args) };
            (normalize_spaces(&base), args)
        }
        _ => (normalize_spaces(trimmed), None),
    }
}

fn normalize_spaces(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Classify a source type string into a family.
///
/// Returns `None` when no rule matches (e.g., spatial types).
pub fn classify(source_type: &str) -> Option<TypeFamily> {
    let (base, _) = split_type(source_type);
    let t = base.as_str();

    if t.contains("char") || t.contains("text") || t.contains("clob") || t == "string" {
        if t.contains("var") {
            return Some(TypeFamily::Varchar);
        }
        if t.contains("text") || t.contains("clob") || t == "string" {
            return Some(TypeFamily::Text);
        }
        return Some(TypeFamily::Char);
    }

    if (t.contains("int") && !t.contains("interval") && !t.contains("point"))
        || t.contains("serial")
    {
        return Some(if t.contains("big") || t == "int8" {
            TypeFamily::BigInt
        } else if t.contains("small") || t == "int2" {
            TypeFamily::SmallInt
        } else if t.contains("tiny") {
            TypeFamily::TinyInt
        } else {
            TypeFamily::Integer
        });
    }

    if t.contains("dec") || t.contains("numeric") || t.contains("money") || t == "number" {
        return Some(TypeFamily::Decimal);
    }

    if t.contains("double") || t == "float8" {
        return Some(TypeFamily::Double);
    }
    if t.contains("real") || t == "float4" || t == "binary_float" {
        return Some(TypeFamily::Float);
    }
    if t.contains("float") {
        return Some(TypeFamily::Double);
    }

    if t.contains("bool") || t == "bit" {
        return Some(TypeFamily::Boolean);
    }

    if t.contains("date") || t.contains("time") {
        if t.starts_with("time") && !t.contains("timestamp") {
            return Some(TypeFamily::Time);
        }
        if t.contains("with time zone") || t == "timestamptz" || t.contains("offset") {
            return Some(TypeFamily::TimestampTz);
        }
        if t.contains("datetime") || t.contains("timestamp") {
            return Some(TypeFamily::Timestamp);
        }
        return Some(TypeFamily::Date);
    }

    if t.contains("binary") || t.contains("blob") || t == "bytea" || t == "image" || t == "raw" {
        return Some(TypeFamily::Binary);
    }

    if t.contains("json") {
        return Some(TypeFamily::Json);
    }
    if t.contains("xml") {
        return Some(TypeFamily::Xml);
    }
    if t.contains("uuid") || t == "uniqueidentifier" || t.contains("guid") {
        return Some(TypeFamily::Uuid);
    }

    None
}
