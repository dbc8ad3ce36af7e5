//! Curated tier: a fixed, read-only set of known scholarships.
//!
//! Loaded once at startup and shared across requests behind an `Arc`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::profile::StudentProfile;
use crate::models::scholarship::{CandidateSource, ScholarshipCandidate};
use crate::recommendations::eligibility::{compact, education_category, field_keywords_in};

const BUILTIN_CATALOG: &str = include_str!("../../data/curated_scholarships.json");

#[derive(Debug, Deserialize)]
struct CuratedRecord {
    name: String,
    eligibility: String,
    deadline: String,
    amount: String,
    link: String,
    #[serde(default = "default_target_group")]
    target_group: String,
    last_updated: DateTime<Utc>,
}

fn default_target_group() -> String {
    "ALL".to_string()
}

#[derive(Debug, Clone, Default)]
pub struct CuratedCatalog {
    records: Vec<ScholarshipCandidate>,
}

impl CuratedCatalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, serde_json::Error> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<CuratedRecord> = serde_json::from_str(json)?;
        Ok(Self::new(
            records
                .into_iter()
                .map(|r| ScholarshipCandidate {
                    name: r.name.trim().to_string(),
                    eligibility: r.eligibility,
                    deadline: r.deadline,
                    amount: r.amount,
                    link: r.link,
                    source: CandidateSource::Curated,
                    target_group: r.target_group,
                    last_updated: r.last_updated,
                    note: None,
                })
                .collect(),
        ))
    }

    pub fn new(records: Vec<ScholarshipCandidate>) -> Self {
        Self { records }
    }

    pub fn all(&self) -> &[ScholarshipCandidate] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose name or eligibility mentions a taxonomy term derived from
    /// the profile's education level or major. Fails open: when nothing
    /// matches, the whole catalog is returned.
    pub fn fetch(&self, profile: &StudentProfile) -> Vec<ScholarshipCandidate> {
        let mut terms: Vec<String> = education_category(&profile.education_level)
            .map(|(_, variants)| variants.iter().map(|v| compact(v)).collect())
            .unwrap_or_default();
        terms.extend(field_keywords_in(&profile.major_field).into_iter().map(compact));

        let matched: Vec<ScholarshipCandidate> = self
            .records
            .iter()
            .filter(|record| {
                let haystack = compact(&format!("{} {}", record.name, record.eligibility));
                terms.iter().any(|term| haystack.contains(term.as_str()))
            })
            .cloned()
            .collect();

        if matched.is_empty() {
            self.records.clone()
        } else {
            matched
        }
    }
}
