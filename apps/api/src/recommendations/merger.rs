//! Result merging: dedup across tiers by identity key, then rank and truncate.

use std::collections::HashMap;

use crate::models::scholarship::{CandidateSource, MatchResult};

pub struct ResultMerger {
    cap: usize,
}

impl ResultMerger {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    /// Keeps one entry per identity key: the higher score wins, a tie goes to
    /// the generated entry. Output is descending by score, at most `cap` long.
    /// Equal scores keep first-seen order.
    pub fn merge(&self, batches: Vec<Vec<MatchResult>>) -> Vec<MatchResult> {
        let mut merged: Vec<MatchResult> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for result in batches.into_iter().flatten() {
            let key = result.scholarship.identity_key();
            match index.get(&key) {
                Some(&at) => {
                    if supersedes(&result, &merged[at]) {
                        merged[at] = result;
                    }
                }
                None => {
                    index.insert(key, merged.len());
                    merged.push(result);
                }
            }
        }

        merged.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
        merged.truncate(self.cap);
        merged
    }
}

fn supersedes(candidate: &MatchResult, existing: &MatchResult) -> bool {
    if candidate.match_score != existing.match_score {
        return candidate.match_score > existing.match_score;
    }
    candidate.scholarship.source == CandidateSource::Generated
        && existing.scholarship.source == CandidateSource::Curated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scholarship::ScholarshipCandidate;
    use chrono::Utc;

    fn result(name: &str, score: f64, source: CandidateSource) -> MatchResult {
        MatchResult {
            scholarship: ScholarshipCandidate {
                name: name.to_string(),
                eligibility: "Anyone".to_string(),
                deadline: "Varies".to_string(),
                amount: "Varies".to_string(),
                link: format!("https://{}.org/", source_label(source)),
                source,
                target_group: "ALL".to_string(),
                last_updated: Utc::now(),
                note: None,
            },
            match_score: score,
            reason: source_label(source).to_string(),
        }
    }

    fn source_label(source: CandidateSource) -> &'static str {
        match source {
            CandidateSource::Curated => "curated",
            CandidateSource::Generated => "generated",
        }
    }

    #[test]
    fn test_same_name_across_tiers_keeps_higher_score() {
        let merged = ResultMerger::new(8).merge(vec![
            vec![result("Merit Scholarship for Engineering", 0.6, CandidateSource::Curated)],
            vec![result("Merit Scholarship for Engineering", 0.8, CandidateSource::Generated)],
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].match_score, 0.8);
        assert_eq!(merged[0].scholarship.source, CandidateSource::Generated);
    }

    #[test]
    fn test_higher_curated_score_beats_generated() {
        let merged = ResultMerger::new(8).merge(vec![
            vec![result("Award", 0.9, CandidateSource::Curated)],
            vec![result("award", 0.5, CandidateSource::Generated)],
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].scholarship.source, CandidateSource::Curated);
    }

    #[test]
    fn test_tie_prefers_generated_regardless_of_order() {
        for batches in [
            vec![
                vec![result("Award", 0.6, CandidateSource::Curated)],
                vec![result("Award", 0.6, CandidateSource::Generated)],
            ],
            vec![
                vec![result("Award", 0.6, CandidateSource::Generated)],
                vec![result("Award", 0.6, CandidateSource::Curated)],
            ],
        ] {
            let merged = ResultMerger::new(8).merge(batches);
            assert_eq!(merged[0].scholarship.source, CandidateSource::Generated);
        }
    }

    #[test]
    fn test_identity_key_ignores_case_and_spacing() {
        let merged = ResultMerger::new(8).merge(vec![vec![
            result("Gates  Cambridge Scholarship", 0.4, CandidateSource::Curated),
            result("gates cambridge scholarship ", 0.5, CandidateSource::Curated),
        ]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].match_score, 0.5);
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let batch: Vec<MatchResult> = (0..10)
            .map(|i| result(&format!("Award {i}"), i as f64 / 10.0, CandidateSource::Curated))
            .collect();
        let merged = ResultMerger::new(5).merge(vec![batch]);
        assert_eq!(merged.len(), 5);
        assert_eq!(merged[0].scholarship.name, "Award 9");
        assert!(merged.windows(2).all(|w| w[0].match_score >= w[1].match_score));
    }

    #[test]
    fn test_empty_input_yields_empty_batch() {
        assert!(ResultMerger::new(5).merge(vec![]).is_empty());
        assert!(ResultMerger::new(5).merge(vec![vec![], vec![]]).is_empty());
    }
}
