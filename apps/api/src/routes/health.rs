use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version, enabled tiers and the batch cap.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "scholar-api",
        "tiers": {
            "generative": state.pipeline.generative_enabled(),
            "curated": state.pipeline.curated_enabled(),
        },
        "max_recommendations": state.config.max_recommendations,
    }))
}
