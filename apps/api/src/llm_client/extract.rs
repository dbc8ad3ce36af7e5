//! Best-effort structured extraction from free-text LLM replies.
//!
//! The model is told to answer with bare JSON but routinely wraps it in
//! markdown fences or surrounds it with commentary. This is the only place that
//! digs JSON out of prose; everything downstream works on parsed values.

use serde_json::{Map, Value};

/// Object elements of a top-level JSON array.
pub type ParsedArray = Vec<Map<String, Value>>;

/// Returns the object elements of the first well-formed JSON array in `text`.
///
/// Fenced or bare replies are tried whole first; otherwise every `[` is tried as
/// the start of a JSON value. Non-object elements are dropped one by one. An
/// array holding elements but no objects at all (e.g. a stray "[3]" in prose)
/// is skipped, and the scan resumes after its closing bracket.
pub fn extract_json_array(text: &str) -> Option<ParsedArray> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(strip_json_fences(text)) {
        if let Some(objects) = objects_of(items) {
            return Some(objects);
        }
    }

    let mut from = 0;
    while let Some(offset) = text[from..].find('[') {
        let start = from + offset;
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Array(items))) => {
                if let Some(objects) = objects_of(items) {
                    return Some(objects);
                }
                from = start + stream.byte_offset();
            }
            _ => from = start + 1,
        }
    }
    None
}

fn objects_of(items: Vec<Value>) -> Option<ParsedArray> {
    let total = items.len();
    let objects: ParsedArray = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    (total == 0 || !objects.is_empty()).then_some(objects)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
