//! Column default conversion.

use crate::core::Dialect;

/// Source functions producing the current date and time.
const TIME_FUNCTIONS: &[&str] = &[
    "getdate()",
    "getutcdate()",
    "sysdatetime()",
    "sysutcdatetime()",
    "current_timestamp",
    "current_timestamp()",
    "now()",
    "localtimestamp",
    "systimestamp",
    "sysdate",
];

/// Source functions producing a random UUID.
const GUID_FUNCTIONS: &[&str] = &[
    "newid()",
    "newsequentialid()",
    "uuid()",
    "gen_random_uuid()",
    "uuid_generate_v4()",
    "sys_guid()",
];

/// Convert a raw source default into a target default expression.
///
/// ```ignore
/// assert_eq!(convert_default_value("(getdate())", &pg), "CURRENT_TIMESTAMP");
/// assert_eq!(convert_default_value("((0))", &pg), "0");
/// ```
pub fn convert_default_value(raw: &str, target: &dyn Dialect) -> String {
    let value = strip_outer_parens(raw.trim());
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        return "NULL".to_string();
    }

    let lower: String = value.to_lowercase().split_whitespace().collect();
    if TIME_FUNCTIONS.contains(&lower.as_str()) {
        return target.current_timestamp().to_string();
    }
    if GUID_FUNCTIONS.contains(&lower.as_str()) {
        return target.uuid_function().to_string();
    }

    if is_quoted_literal(value) {
        return value.to_string();
    }
    if let Some(unicode) = value.strip_prefix(['N', 'n']) {
        if is_quoted_literal(unicode) {
            return if target.supports_national_literals() {
                value.to_string()
            } else {
                unicode.to_string()
            };
        }
    }
    if is_numeric_literal(value) {
        return value.to_string();
    }

    target.string_literal(value)
}

/// Boolean literal for a numeric default on a boolean column.
pub fn boolean_default(converted: &str, target: &dyn Dialect) -> Option<&'static str> {
    match converted.trim_matches('\'').to_lowercase().as_str() {
        "1" | "true" => Some(target.boolean_literal(true)),
        "0" | "false" => Some(target.boolean_literal(false)),
        _ => None,
    }
}

/// Strip balanced parentheses wrapping the whole expression, repeatedly.
fn strip_outer_parens(mut value: &str) -> &str {
    while value.starts_with('(') && value.ends_with(')') && wraps_whole(value) {
        value = value[1..value.len() - 1].trim();
    }
    value
}

/// Check that the opening parenthesis closes at the last character.
fn wraps_whole(value: &str) -> bool {
    let mut depth = 0i32;
    let mut in_quote = false;
    for (i, c) in value.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth == 0 {
                    return i == value.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

fn is_quoted_literal(value: &str) -> bool {
    if value.len() < 2 || !value.starts_with('\'') || !value.ends_with('\'') {
        return false;
    }
    // Inner quotes must be doubled.
    let inner = &value[1..value.len() - 1];
    inner.replace("''", "").find('\'').is_none()
}

fn is_numeric_literal(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match frac_part {
        None => all_digits(int_part),
        Some(f) => {
            (all_digits(int_part) || int_part.is_empty()) && all_digits(f)
        }
    }
}
