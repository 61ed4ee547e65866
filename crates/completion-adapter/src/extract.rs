//! Pull a JSON array of records out of free-form model text.

use seed_core::Record;
use serde_json::Value;

use crate::error::CompletionError;

/// Extract the first JSON array in `text` and return its object elements.
///
/// The array starts at the first `[` and ends at its matching `]`, skipping
/// brackets inside string literals. If no match is found the last `]` in the
/// text is used instead. Elements that are not objects are dropped.
pub fn extract_json_array(text: &str) -> Result<Vec<Record>, CompletionError> {
    let start = text
        .find('[')
        .ok_or_else(|| CompletionError::Unparseable("no JSON array in response".into()))?;

    let end = matching_bracket(text, start)
        .or_else(|| text.rfind(']').filter(|&i| i > start))
        .ok_or_else(|| CompletionError::Unparseable("no closing bracket for JSON array".into()))?;

    let slice = text[start..=end].trim();
    let value: Value = serde_json::from_str(slice).map_err(|e| {
        let snippet: String = slice.chars().take(200).collect();
        tracing::debug!("JSON snippet: {snippet}");
        CompletionError::Unparseable(format!("invalid JSON array: {e}"))
    })?;

    let Value::Array(items) = value else {
        return Err(CompletionError::Unparseable("response is not a JSON array".into()));
    };

    let total = items.len();
    let records: Vec<Record> = items.into_iter().filter_map(Record::from_value).collect();
    if records.len() < total {
        tracing::warn!(
            "Dropped {} non-object elements from model response",
            total - records.len()
        );
    }
    Ok(records)
}

/// Byte index of the `]` closing the `[` at `start`.
fn matching_bracket(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_string = !in_string,
            '[' if !in_string => depth += 1,
            ']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}
