//! Text generator adapters and response helpers.
//!
//! The engine talks to the generative backend only through
//! [`TextGenerator`](crate::core::TextGenerator). This module provides:
//!
//! - [`UnavailableGenerator`]: always fails, so every call site takes its fallback
//! - [`CommandGenerator`]: pipes the prompt through an external command
//! - response helpers shared by every call site's validation policy

mod command;

pub use command::CommandGenerator;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::TextGenerator;
use crate::error::{MigrateError, Result};

/// Generator used when no backend is configured.
#[derive(Debug, Clone, Default)]
pub struct UnavailableGenerator;

#[async_trait]
impl TextGenerator for UnavailableGenerator {
    async fn generate_text(&self, _prompt: &str) -> Result<String> {
        Err(MigrateError::generation("no text generator configured"))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Remove a surrounding markdown code fence, if any.
///
/// Models often answer with ```` ```sql ... ``` ````; only the fenced body is
/// kept. Text without a fence is returned trimmed.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed.to_string();
    };
    let after_open = &trimmed[start + 3..];
    // Skip the language tag on the opening fence line.
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(after_open.len());
    let body = &after_open[body_start..];
    match body.find("```") {
        Some(end) => body[..end].trim().to_string(),
        None => body.trim().to_string(),
    }
}

/// Extract the first parseable JSON object embedded in free text.
///
/// Each `{` is tried in turn as the start of a value. The stream parser stops
/// at the end of the first value, so trailing prose is tolerated and a
/// truncated object costs one pass over the remaining text.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let text = strip_code_fences(text);
    text.match_indices('{').find_map(|(open, _)| {
        let mut values = serde_json::Deserializer::from_str(&text[open..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(value @ Value::Object(_))) => Some(value),
            _ => None,
        }
    })
}
