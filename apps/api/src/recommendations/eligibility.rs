//! Eligibility Scoring: deterministic additive rule table for (profile, candidate) pairs.
//!
//! Rules, evaluated in order:
//! 1. Base match → 0.1, always
//! 2. Education level: category synonym hit → +0.3, else raw substring hit → +0.2
//! 3. Field relevance: a field keyword in both the major and the candidate → +0.2
//! 4. Merit: GPA ≥ 80% of 4.0 and "merit" in name → +0.2,
//!    else an excellence keyword in eligibility → +0.15
//!
//! The base weight is counted once; the result is capped at 1.0.
//! Used for the curated tier only. Generated candidates arrive pre-scored.

use crate::models::profile::{is_missing, StudentProfile};
use crate::models::scholarship::{round_score, MatchResult, ScholarshipCandidate};

pub const BASE_SCORE: f64 = 0.1;
const EDUCATION_CATEGORY_WEIGHT: f64 = 0.3;
const EDUCATION_SUBSTRING_WEIGHT: f64 = 0.2;
const FIELD_WEIGHT: f64 = 0.2;
const MERIT_NAME_WEIGHT: f64 = 0.2;
const EXCELLENCE_WEIGHT: f64 = 0.15;
const MERIT_GPA_PERCENT: f64 = 80.0;

pub const GENERAL_MATCH_REASON: &str = "General match (no strong criteria met)";

/// Education categories and the eligibility phrasings that count as a hit.
/// Keys and variants are compared with spaces stripped.
pub const EDUCATION_KEYWORDS: &[(&str, &[&str])] = &[
    ("highschool", &["highschool", "secondary", "k-12", "school"]),
    (
        "undergraduate",
        &["undergraduate", "college", "university", "bachelor", "bachelors"],
    ),
    (
        "graduate",
        &["graduate", "masters", "phd", "doctoral", "postgraduate"],
    ),
];

/// Field keywords checked in order; the first one present in both sides wins.
pub const FIELD_KEYWORDS: &[&str] = &[
    "computer science",
    "engineering",
    "medical",
    "arts",
    "science",
    "commerce",
    "law",
    "technology",
    "tech",
    "stem",
    "ml",
    "ai",
    "machine learning",
];

const EXCELLENCE_KEYWORDS: &[&str] = &["outstanding", "excellent", "meritorious"];

/// Score plus the human-readable reasons that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityScore {
    pub score: f64,
    pub reasons: Vec<String>,
}

impl EligibilityScore {
    /// True when nothing beyond the base rule fired.
    pub fn is_base_only(&self) -> bool {
        self.reasons.len() == 1
    }
}

/// Lower-cases and strips spaces, matching how education phrases are compared.
pub fn compact(text: &str) -> String {
    text.to_lowercase().replace(' ', "")
}

/// The education category a profile belongs to. The longest matching key wins
/// so "undergraduate" is never read as "graduate".
pub fn education_category(education_level: &str) -> Option<(&'static str, &'static [&'static str])> {
    if is_missing(education_level) {
        return None;
    }
    let level = compact(education_level);
    EDUCATION_KEYWORDS
        .iter()
        .filter(|(key, _)| level.contains(key))
        .max_by_key(|(key, _)| key.len())
        .copied()
}

/// Field keywords that appear in the given major.
pub fn field_keywords_in(major: &str) -> Vec<&'static str> {
    if is_missing(major) {
        return Vec::new();
    }
    let major = major.to_lowercase();
    FIELD_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| major.contains(kw))
        .collect()
}

pub fn score(profile: &StudentProfile, candidate: &ScholarshipCandidate) -> EligibilityScore {
    let mut bonus = 0.0_f64;
    let mut reasons = vec!["Base match".to_string()];

    if let Some(weight_and_reason) = education_match(profile, candidate) {
        bonus += weight_and_reason.0;
        reasons.push(weight_and_reason.1);
    }

    let name = candidate.name.to_lowercase();
    let eligibility = candidate.eligibility.to_lowercase();

    if let Some(keyword) = field_keywords_in(&profile.major_field)
        .into_iter()
        .find(|kw| eligibility.contains(kw) || name.contains(kw))
    {
        bonus += FIELD_WEIGHT;
        reasons.push(format!("Relevant for {keyword} students"));
    }

    if let (Some(gpa), Some(percent)) = (profile.gpa.value(), profile.gpa.percent()) {
        if percent >= MERIT_GPA_PERCENT {
            if name.contains("merit") {
                bonus += MERIT_NAME_WEIGHT;
                reasons.push(format!("Matches merit criteria (GPA: {gpa})"));
            } else if EXCELLENCE_KEYWORDS.iter().any(|kw| eligibility.contains(kw)) {
                bonus += EXCELLENCE_WEIGHT;
                reasons.push("Matches academic excellence criteria".to_string());
            }
        }
    }

    EligibilityScore {
        score: round_score((BASE_SCORE + bonus).min(1.0)),
        reasons,
    }
}

fn education_match(profile: &StudentProfile, candidate: &ScholarshipCandidate) -> Option<(f64, String)> {
    if is_missing(&profile.education_level) {
        return None;
    }
    let eligibility = compact(&candidate.eligibility);

    if let Some((_, variants)) = education_category(&profile.education_level) {
        if variants.iter().any(|v| eligibility.contains(v)) {
            return Some((
                EDUCATION_CATEGORY_WEIGHT,
                format!("Matches your education level ({})", profile.education_level),
            ));
        }
    }

    let level = compact(&profile.education_level);
    if !level.is_empty() && eligibility.contains(&level) {
        return Some((
            EDUCATION_SUBSTRING_WEIGHT,
            format!("Partial education level match ({})", profile.education_level),
        ));
    }

    None
}

/// Scores every candidate and ranks them descending. When no rule beyond the
/// base fired for any candidate, all are kept at the base score.
pub fn score_candidates(
    profile: &StudentProfile,
    candidates: &[ScholarshipCandidate],
) -> Vec<MatchResult> {
    let scored: Vec<(ScholarshipCandidate, EligibilityScore)> = candidates
        .iter()
        .map(|c| (c.clone(), score(profile, c)))
        .collect();

    let nothing_fired = scored.iter().all(|(_, s)| s.is_base_only());

    let mut results: Vec<MatchResult> = scored
        .into_iter()
        .map(|(scholarship, s)| {
            if nothing_fired {
                MatchResult {
                    scholarship,
                    match_score: BASE_SCORE,
                    reason: GENERAL_MATCH_REASON.to_string(),
                }
            } else {
                MatchResult {
                    scholarship,
                    match_score: s.score,
                    reason: s.reasons.join(". "),
                }
            }
        })
        .collect();

    results.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    results
}
