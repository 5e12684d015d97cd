use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use super::SimulationError;

/// A whole-text code fence: opening backticks with an optional language
/// tag, the payload, closing backticks. Anchored at both ends, so text
/// with a preamble or trailer is left untouched.
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").unwrap());

/// Remove one surrounding code fence, if the whole text is fenced.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match CODE_FENCE.captures(trimmed).and_then(|c| c.get(2)) {
        Some(inner) if !inner.as_str().is_empty() => inner.as_str().trim(),
        _ => trimmed,
    }
}

/// Recover a typed value from raw model output.
///
/// Fails with `InvalidFormat` tagged with `context` on any parse error;
/// nothing partially parsed is ever returned.
pub fn parse_json_response<T: DeserializeOwned>(
    text: &str,
    context: &str,
) -> Result<T, SimulationError> {
    let json_str = strip_code_fence(text);
    serde_json::from_str(json_str).map_err(|e| {
        tracing::error!(context, error = %e, "Failed to parse JSON response");
        tracing::error!(context, raw = %text, "Raw text from AI");
        SimulationError::InvalidFormat {
            context: context.to_string(),
        }
    })
}
