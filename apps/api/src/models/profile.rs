use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Raw profile as received from the caller: arbitrary keys, arbitrary value types.
pub type RawProfile = Map<String, Value>;

/// Placeholder stored for any string field the caller left out.
pub const MISSING_FIELD: &str = "N/A";

/// GPA after normalization. Never a raw string downstream.
/// Serializes as a number, or as `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gpa {
    Known(f64),
    Unknown,
}

impl Gpa {
    pub fn value(&self) -> Option<f64> {
        match self {
            Gpa::Known(v) => Some(*v),
            Gpa::Unknown => None,
        }
    }

    /// GPA on a 4.0 scale expressed as a percentage.
    pub fn percent(&self) -> Option<f64> {
        self.value().map(|v| v / 4.0 * 100.0)
    }
}

impl Serialize for Gpa {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Gpa::Known(v) => serializer.serialize_f64(*v),
            Gpa::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl std::fmt::Display for Gpa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gpa::Known(v) => write!(f, "{v}"),
            Gpa::Unknown => f.write_str("Not provided"),
        }
    }
}

/// Canonical student profile produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentProfile {
    pub name: String,
    /// Lower-cased free text, e.g. "undergraduate".
    pub education_level: String,
    pub gpa: Gpa,
    pub major_field: String,
    pub nationality: String,
    pub interests: String,
    pub achievements: String,
}

/// True when a normalized string field holds the missing-field placeholder.
pub fn is_missing(field: &str) -> bool {
    field.eq_ignore_ascii_case(MISSING_FIELD)
}
