//! Recommendation Pipeline: the tiered fallback state machine.
//!
//! GenerateAttempt → GenerateSuccess | GenerateFailure → CuratedFallback → Score
//!   → ValidateLinks → Merge → Done
//!
//! Each tier is attempted at most once per request. Tier failures are logged
//! and turned into transitions; only exhaustion of every tier reaches the
//! caller, as an empty batch with an explanatory message.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::llm_client::LlmError;
use crate::models::profile::{RawProfile, StudentProfile};
use crate::models::scholarship::{CandidateSource, MatchResult, RecommendationBatch};
use crate::recommendations::curated::CuratedCatalog;
use crate::recommendations::eligibility::score_candidates;
use crate::recommendations::generative::GenerativeCandidateSource;
use crate::recommendations::links::LinkValidator;
use crate::recommendations::merger::ResultMerger;
use crate::recommendations::normalizer::normalize_profile;

pub const SUCCESS_MESSAGE: &str = "Successfully found matching scholarships";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Generation call failed: {0}")]
    GenerationCall(#[from] LlmError),

    #[error("Generation reply could not be parsed: {0}")]
    GenerationParse(String),

    #[error("Generation returned no usable candidates ({parsed} parsed)")]
    NoUsableGenerated { parsed: usize },

    #[error("Link check for {url} timed out after {after:?}")]
    ValidationTimeout { url: String, after: Duration },

    #[error("No matching scholarships found at this time. Please try adjusting your profile.")]
    NoCandidates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    GenerateAttempt,
    GenerateSuccess,
    GenerateFailure,
    CuratedFallback,
    Score,
    ValidateLinks,
    Merge,
    Done,
}

/// Stateless across requests; safe to share behind an `Arc`.
pub struct RecommendationPipeline {
    generative: Option<GenerativeCandidateSource>,
    curated: Option<Arc<CuratedCatalog>>,
    validator: LinkValidator,
    merger: ResultMerger,
    blend_curated: bool,
}

impl RecommendationPipeline {
    /// A pipeline with no tiers enabled; add them with the `with_*` methods.
    pub fn new(validator: LinkValidator, max_results: usize) -> Self {
        Self {
            generative: None,
            curated: None,
            validator,
            merger: ResultMerger::new(max_results),
            blend_curated: false,
        }
    }

    pub fn with_generative(mut self, source: GenerativeCandidateSource) -> Self {
        self.generative = Some(source);
        self
    }

    pub fn with_curated(mut self, catalog: Arc<CuratedCatalog>) -> Self {
        self.curated = Some(catalog);
        self
    }

    /// Also merge curated matches when the generative tier succeeds.
    pub fn with_blending(mut self, blend_curated: bool) -> Self {
        self.blend_curated = blend_curated;
        self
    }

    pub fn generative_enabled(&self) -> bool {
        self.generative.is_some()
    }

    pub fn curated_enabled(&self) -> bool {
        self.curated.is_some()
    }

    /// Entry point for the endpoint layer. Never fails; see `RecommendationBatch::message`.
    pub async fn get_recommendations(&self, raw: &RawProfile) -> RecommendationBatch {
        let profile = normalize_profile(raw);
        let span = info_span!("recommendations", request_id = %Uuid::new_v4());
        self.recommend(&profile).instrument(span).await
    }

    pub async fn recommend(&self, profile: &StudentProfile) -> RecommendationBatch {
        let mut state = PipelineState::GenerateAttempt;
        let mut trace = Vec::new();
        let mut tiers: Vec<Vec<MatchResult>> = Vec::new();
        let mut curated_candidates = Vec::new();
        let mut authoritative: Option<CandidateSource> = None;
        let mut ranked = Vec::new();

        loop {
            trace.push(state);
            state = match state {
                PipelineState::GenerateAttempt => match &self.generative {
                    Some(source) => match source.fetch(profile).await {
                        Ok(results) => {
                            tiers.push(results);
                            PipelineState::GenerateSuccess
                        }
                        Err(e) => {
                            warn!("Generative tier failed, falling back to curated tier: {e}");
                            PipelineState::GenerateFailure
                        }
                    },
                    None => PipelineState::GenerateFailure,
                },
                PipelineState::GenerateSuccess => {
                    authoritative = Some(CandidateSource::Generated);
                    if self.blend_curated {
                        PipelineState::CuratedFallback
                    } else {
                        PipelineState::ValidateLinks
                    }
                }
                PipelineState::GenerateFailure => PipelineState::CuratedFallback,
                PipelineState::CuratedFallback => {
                    curated_candidates = self
                        .curated
                        .as_ref()
                        .map(|catalog| catalog.fetch(profile))
                        .unwrap_or_default();
                    PipelineState::Score
                }
                PipelineState::Score => {
                    let scored = score_candidates(profile, &curated_candidates);
                    if !scored.is_empty() && authoritative.is_none() {
                        authoritative = Some(CandidateSource::Curated);
                    }
                    tiers.push(scored);
                    PipelineState::ValidateLinks
                }
                PipelineState::ValidateLinks => {
                    // Only entries that can survive the cap are probed. Sanitizing
                    // never changes a score or a name, so merging again is a no-op.
                    let shortlist = self.merger.merge(std::mem::take(&mut tiers));
                    tiers = vec![self.validator.sanitize_all(shortlist).await];
                    PipelineState::Merge
                }
                PipelineState::Merge => {
                    ranked = self.merger.merge(std::mem::take(&mut tiers));
                    PipelineState::Done
                }
                PipelineState::Done => break,
            };
        }

        let (tier, message) = if ranked.is_empty() {
            (None, PipelineError::NoCandidates.to_string())
        } else {
            (authoritative, SUCCESS_MESSAGE.to_string())
        };

        let batch = RecommendationBatch {
            message,
            tier,
            recommendations: ranked,
            trace,
        };
        info!(
            "Recommendation pipeline finished: tier={:?}, {} results, states={:?}",
            batch.tier,
            batch.len(),
            batch.trace
        );
        batch
    }
}
