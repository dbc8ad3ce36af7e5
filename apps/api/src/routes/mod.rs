pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommendations::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendations API
        .route(
            "/api/v1/scholarships",
            get(handlers::handle_list_scholarships),
        )
        .route(
            "/api/v1/scholarships/recommendations",
            post(handlers::handle_recommendations),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::recommendations::curated::CuratedCatalog;
    use crate::recommendations::pipeline::RecommendationPipeline;
    use crate::recommendations::test_support::{always_live_validator, generator_failing};

    fn app() -> Router {
        let catalog = Arc::new(CuratedCatalog::builtin().unwrap());
        let pipeline = RecommendationPipeline::new(always_live_validator(), 7)
            .with_generative(generator_failing())
            .with_curated(catalog.clone());
        build_router(AppState {
            config: Config::from_lookup(|_| None).unwrap(),
            catalog,
            pipeline: Arc::new(pipeline),
        })
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_tiers() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["tiers"]["generative"], true);
        assert_eq!(body["tiers"]["curated"], true);
        assert_eq!(body["max_recommendations"], 7);
    }

    #[tokio::test]
    async fn test_list_scholarships_returns_catalog() {
        let (status, body) =
            send(Request::get("/api/v1/scholarships").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        let expected = CuratedCatalog::builtin().unwrap().len();
        assert_eq!(body["scholarships"].as_array().unwrap().len(), expected);
    }

    #[tokio::test]
    async fn test_missing_required_fields_is_bad_request() {
        let (status, body) = send(post_json(
            "/api/v1/scholarships/recommendations",
            json!({ "name": "Ada", "gpa": 3.9 }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["message"],
            "Missing required fields: educationLevel, majorField"
        );
    }

    #[tokio::test]
    async fn test_recommendations_fall_back_to_curated() {
        let (status, body) = send(post_json(
            "/api/v1/scholarships/recommendations",
            json!({
                "name": "Priya",
                "educationLevel": "Undergraduate",
                "gpa": "3.8",
                "majorField": "Computer Science",
                "nationality": "Indian",
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tier"], "curated");
        assert_eq!(body["message"], "Successfully found matching scholarships");
        let recs = body["recommendations"].as_array().unwrap();
        assert!(!recs.is_empty() && recs.len() <= 7);
        assert!(recs[0]["scholarship"]["name"].is_string());
        assert!(recs[0]["match_score"].as_f64().unwrap() <= 1.0);
    }
}
