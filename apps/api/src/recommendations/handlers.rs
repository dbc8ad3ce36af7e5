//! Axum route handlers for the Recommendations API.

use anyhow::anyhow;
use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::profile::RawProfile;
use crate::models::scholarship::{CandidateSource, MatchResult, ScholarshipCandidate};
use crate::recommendations::normalizer::missing_required_fields;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub message: String,
    pub tier: Option<CandidateSource>,
    pub recommendations: Vec<MatchResult>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub scholarships: Vec<ScholarshipCandidate>,
}

/// POST /api/v1/scholarships/recommendations
///
/// Validates required profile fields, then runs the pipeline on its own task
/// so a panic inside one request cannot take down others.
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Json(profile): Json<RawProfile>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let missing = missing_required_fields(&profile);
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let pipeline = state.pipeline.clone();
    let batch = tokio::spawn(async move { pipeline.get_recommendations(&profile).await })
        .await
        .map_err(|e| AppError::Internal(anyhow!("Recommendation task failed: {e}")))?;

    if batch.is_empty() {
        info!("No recommendations for request: {}", batch.message);
    } else {
        debug!("Returning {} recommendations (tier: {:?})", batch.len(), batch.tier);
    }

    Ok(Json(RecommendationsResponse {
        message: batch.message,
        tier: batch.tier,
        recommendations: batch.recommendations,
    }))
}

/// GET /api/v1/scholarships
///
/// Returns the full curated catalog.
pub async fn handle_list_scholarships(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        scholarships: state.catalog.all().to_vec(),
    })
}
