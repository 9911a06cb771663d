//! Helpers for JSON embedded in free-form model output.

use anyhow::{Context, Result};
use serde_json::Value;

/// Strip a surrounding markdown code fence (```` ```json ```` or bare ```` ``` ````).
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse the outermost JSON value of a model reply, tolerating fences and
/// leading or trailing prose around a single object or array.
pub fn extract_outer_value(raw: &str) -> Result<Value> {
    let cleaned = strip_code_fence(raw);
    if let Ok(value) = serde_json::from_str(cleaned) {
        return Ok(value);
    }

    let start = cleaned
        .find(['{', '['])
        .context("no JSON object or array in payload")?;
    let closing = if cleaned[start..].starts_with('{') { '}' } else { ']' };
    let end = cleaned
        .rfind(closing)
        .filter(|end| *end > start)
        .context("unterminated JSON payload")?;

    serde_json::from_str(&cleaned[start..=end]).context("payload is not valid JSON")
}
