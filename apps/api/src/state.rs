use std::sync::Arc;

use crate::config::Config;
use crate::recommendations::curated::CuratedCatalog;
use crate::recommendations::pipeline::RecommendationPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Curated tier dataset, also served as-is by the catalog endpoint.
    pub catalog: Arc<CuratedCatalog>,
    pub pipeline: Arc<RecommendationPipeline>,
}
