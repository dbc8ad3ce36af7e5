//! Profile normalization. Turns an arbitrary key/value profile into a `StudentProfile`.
//!
//! Keys are matched case-insensitively and ignoring `_`, `-` and spaces, so
//! `educationLevel`, `education_level` and `EducationLevel` all resolve to the
//! same field. Never fails: missing strings become "N/A", unparsable GPAs become
//! `Gpa::Unknown`.

use serde_json::Value;

use crate::models::profile::{Gpa, RawProfile, StudentProfile, MISSING_FIELD};

/// Fields the endpoint layer requires before calling the pipeline.
pub const REQUIRED_FIELDS: &[&str] = &["name", "educationLevel", "gpa", "majorField"];

pub fn normalize_profile(raw: &RawProfile) -> StudentProfile {
    StudentProfile {
        name: string_field(raw, "name"),
        education_level: string_field(raw, "educationLevel").to_lowercase(),
        gpa: gpa_field(raw),
        major_field: string_field(raw, "majorField"),
        nationality: string_field(raw, "nationality"),
        interests: string_field(raw, "interests"),
        achievements: string_field(raw, "achievements"),
    }
}

/// Required fields that are absent, null, or blank.
pub fn missing_required_fields(raw: &RawProfile) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|key| match raw_field(raw, key) {
            None => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .collect()
}

/// Looks up a field by canonical key, skipping null values.
pub fn raw_field<'a>(raw: &'a RawProfile, key: &str) -> Option<&'a Value> {
    let wanted = canonical_key(key);
    raw.iter()
        .find(|(k, v)| !v.is_null() && canonical_key(k) == wanted)
        .map(|(_, v)| v)
}

fn canonical_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn string_field(raw: &RawProfile, key: &str) -> String {
    let text = match raw_field(raw, key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    if text.is_empty() {
        MISSING_FIELD.to_string()
    } else {
        text
    }
}

fn gpa_field(raw: &RawProfile) -> Gpa {
    let parsed = match raw_field(raw, "gpa") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => Gpa::Known(v),
        _ => Gpa::Unknown,
    }
}
