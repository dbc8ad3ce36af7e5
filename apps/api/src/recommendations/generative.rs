//! Generative tier. Asks the text-generation service for scholarships and
//! parses its free-text reply.
//!
//! Flow: build prompt → generate (bounded by a timeout) → extract first JSON
//! array → drop entries without name/link or with placeholder links.
//! Entries are self-scored by the service; they are not re-scored here.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::llm_client::extract::extract_json_array;
use crate::llm_client::prompts::{JSON_ARRAY_ONLY_INSTRUCTION, REAL_LINKS_INSTRUCTION};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::profile::StudentProfile;
use crate::models::scholarship::{round_score, CandidateSource, MatchResult, ScholarshipCandidate};
use crate::recommendations::eligibility::BASE_SCORE;
use crate::recommendations::links::is_placeholder_link;
use crate::recommendations::pipeline::PipelineError;
use crate::recommendations::prompts::{RECOMMENDATION_PROMPT_TEMPLATE, RECOMMENDATION_SYSTEM};

const MIN_REQUESTED: usize = 5;
/// Score given to the first entry when the service omits `match_score`.
const RANKED_TOP_SCORE: f64 = 0.9;
const RANKED_STEP: f64 = 0.05;

const DEFAULT_REASON: &str = "Suggested by the scholarship search assistant for your profile";

pub struct GenerativeCandidateSource {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
    max_results: usize,
}

impl GenerativeCandidateSource {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration, max_results: usize) -> Self {
        Self {
            generator,
            timeout,
            max_results,
        }
    }

    pub fn build_prompt(&self, profile: &StudentProfile) -> String {
        RECOMMENDATION_PROMPT_TEMPLATE
            .replace("{min_results}", &MIN_REQUESTED.min(self.max_results).to_string())
            .replace("{max_results}", &self.max_results.to_string())
            .replace("{links_instruction}", REAL_LINKS_INSTRUCTION)
            .replace("{json_instruction}", JSON_ARRAY_ONLY_INSTRUCTION)
            .replace("{education_level}", &profile.education_level)
            .replace("{gpa}", &profile.gpa.to_string())
            .replace("{major_field}", &profile.major_field)
            .replace("{nationality}", &profile.nationality)
            .replace("{interests}", &profile.interests)
            .replace("{achievements}", &profile.achievements)
    }

    /// One generation attempt. Errors are the caller's cue to fall back.
    pub async fn fetch(&self, profile: &StudentProfile) -> Result<Vec<MatchResult>, PipelineError> {
        let prompt = self.build_prompt(profile);
        debug!("Scholarship search prompt: {} chars", prompt.len());

        let reply = tokio::time::timeout(
            self.timeout,
            self.generator.generate(&prompt, RECOMMENDATION_SYSTEM),
        )
        .await
        .map_err(|_| LlmError::TimedOut(self.timeout))??;

        let entries = extract_json_array(&reply).ok_or_else(|| {
            PipelineError::GenerationParse(format!(
                "reply contained no well-formed JSON array ({} chars)",
                reply.len()
            ))
        })?;

        let parsed = entries.len();
        let results = parse_entries(entries);
        info!(
            "Generative tier returned {} usable of {} parsed entries",
            results.len(),
            parsed
        );

        if results.is_empty() {
            return Err(PipelineError::NoUsableGenerated { parsed });
        }
        Ok(results)
    }
}

fn parse_entries(entries: Vec<Map<String, Value>>) -> Vec<MatchResult> {
    let now = Utc::now();

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            let name = text(&entry, "name")?;
            let Some(link) = text(&entry, "link") else {
                warn!("Dropping generated entry {name:?}: no link");
                return None;
            };
            if is_placeholder_link(&link) {
                warn!("Dropping generated entry {name:?}: placeholder link {link}");
                return None;
            }

            let match_score = score(&entry).unwrap_or_else(|| ranked_score(position));

            Some(MatchResult {
                scholarship: ScholarshipCandidate {
                    name,
                    eligibility: text(&entry, "eligibility")
                        .unwrap_or_else(|| "See scholarship website".to_string()),
                    deadline: text(&entry, "deadline").unwrap_or_else(|| "Varies".to_string()),
                    amount: text(&entry, "amount").unwrap_or_else(|| "Varies".to_string()),
                    link,
                    source: CandidateSource::Generated,
                    target_group: "ALL".to_string(),
                    last_updated: now,
                    note: None,
                },
                match_score,
                reason: text(&entry, "reason").unwrap_or_else(|| DEFAULT_REASON.to_string()),
            })
        })
        .collect()
}

/// Trimmed, non-empty string for a key; numbers are rendered as text.
fn text(entry: &Map<String, Value>, key: &str) -> Option<String> {
    let value = match entry.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!value.is_empty()).then_some(value)
}

fn score(entry: &Map<String, Value>) -> Option<f64> {
    let raw = match entry.get("match_score")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    raw.is_finite().then(|| round_score(raw.clamp(0.0, 1.0)))
}

fn ranked_score(position: usize) -> f64 {
    round_score((RANKED_TOP_SCORE - RANKED_STEP * position as f64).max(BASE_SCORE))
}
