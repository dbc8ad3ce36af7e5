use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recommendations::pipeline::PipelineState;

/// Which tier produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Curated,
    Generated,
}

/// A single scholarship record before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipCandidate {
    pub name: String,
    pub eligibility: String,
    /// ISO date or "Varies".
    pub deadline: String,
    pub amount: String,
    pub link: String,
    pub source: CandidateSource,
    pub target_group: String,
    pub last_updated: DateTime<Utc>,
    /// Set when the link was replaced by a search fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ScholarshipCandidate {
    /// Dedup key: lower-cased name with whitespace collapsed.
    pub fn identity_key(&self) -> String {
        identity_key(&self.name)
    }
}

pub fn identity_key(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A candidate annotated with a score in [0, 1] and a rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub scholarship: ScholarshipCandidate,
    pub match_score: f64,
    pub reason: String,
}

/// Ranked, deduplicated, bounded output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationBatch {
    pub message: String,
    /// Tier whose output is authoritative; `None` when every tier came up empty.
    pub tier: Option<CandidateSource>,
    pub recommendations: Vec<MatchResult>,
    #[serde(skip)]
    pub trace: Vec<PipelineState>,
}

impl RecommendationBatch {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recommendations.len()
    }
}

/// Rounds a score to two decimals so additive weights compare exactly.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
