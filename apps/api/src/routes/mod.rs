pub mod health;

use axum::{
    http::Uri,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::middleware::cache::cache_responses;
use crate::middleware::rate_limit::limit_rate;
use crate::recommendation::handlers as recommendation;
use crate::roadmap::handlers as roadmap;
use crate::search::handlers as search;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    // route_layer only wraps routes registered above it: both AI endpoints
    // are cached, all three are rate limited.
    let api = Router::new()
        .route("/recommendations", post(recommendation::handle_recommendations))
        .route("/roadmap", post(roadmap::handle_roadmap))
        .route_layer(from_fn_with_state(state.cache.clone(), cache_responses))
        .route("/health", get(health::health_handler))
        .route_layer(from_fn_with_state(state.rate_limiter.clone(), limit_rate));

    Router::new()
        .nest("/api", api)
        .route(
            "/assessment/submit",
            post(recommendation::handle_assessment_submit),
        )
        .route("/test", post(recommendation::handle_legacy_submit))
        .route("/search", get(search::handle_search))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::catalog::fixtures;
    use crate::llm_client::testing::ScriptedModel;
    use crate::middleware::cache::ResponseCache;
    use crate::middleware::rate_limit::RateLimiter;
    use crate::recommendation::advisor::CareerAdvisor;
    use crate::roadmap::planner::RoadmapPlanner;

    fn app(model: Arc<ScriptedModel>) -> Router {
        build_router(AppState {
            catalog: Arc::new(fixtures::catalog()),
            advisor: CareerAdvisor::new(model.clone()),
            planner: RoadmapPlanner::new(model),
            cache: ResponseCache::new(Duration::from_secs(3600)),
            rate_limiter: RateLimiter::new(100, Duration::from_secs(900)),
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn student() -> Value {
        json!({
            "qualification": "after10th",
            "stream": "Science",
            "age": 15,
            "location": "Wardha",
            "higherStudies": "No"
        })
    }

    const AI_REPLY: &str = r#"[{"title": "Solar Technician", "description": "Installs rooftop panels",
        "requirements": "ITI Electrician", "skills": ["Wiring"], "salary_range": "₹12,000 - ₹25,000",
        "salary_min": 12000, "salary_max": 25000, "path_type": "higher_education"}]"#;

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::new(ScriptedModel::always_failing()))
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("ratelimit-limit"));
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_recommendations_reject_invalid_body() {
        let response = app(Arc::new(ScriptedModel::always_failing()))
            .oneshot(post_json("/api/recommendations", json!({"age": 40})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["qualification", "age", "location"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recommendations_fall_back_when_model_fails() {
        let model = Arc::new(ScriptedModel::always_failing());
        let response = app(model.clone())
            .oneshot(post_json("/api/recommendations", student()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["source"], "Default Recommendations (AI Fallback)");
        assert_eq!(body["careers"][0]["title"], "Pharmacy Assistant");
        assert_eq!(body["careers"].as_array().unwrap().len(), 2);
        assert!(body["requestId"].is_string());
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_recommendations_are_not_cached() {
        let model = Arc::new(ScriptedModel::always_failing());
        let app = app(model.clone());

        let first = app
            .clone()
            .oneshot(post_json("/api/recommendations", student()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(model.calls(), 3);

        let second = app
            .oneshot(post_json("/api/recommendations", student()))
            .await
            .unwrap();
        let body = body_json(second).await;
        assert_eq!(body["source"], "Default Recommendations (AI Fallback)");
        assert_eq!(model.calls(), 6);
    }

    #[tokio::test]
    async fn test_recommendations_are_cached() {
        let model = Arc::new(ScriptedModel::replying(&[AI_REPLY]));
        let app = app(model.clone());

        let first = body_json(
            app.clone()
                .oneshot(post_json("/api/recommendations", student()))
                .await
                .unwrap(),
        )
        .await;
        let second = body_json(
            app.oneshot(post_json("/api/recommendations", student()))
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(first["source"], "AI Recommendations");
        // path type follows the student's answer, not the model's
        assert_eq!(first["careers"][0]["path_type"], "immediate");
        assert_eq!(second, first);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_roadmap_requires_title() {
        let response = app(Arc::new(ScriptedModel::always_failing()))
            .oneshot(post_json("/api/roadmap", json!({"careerTitle": "  "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["field"], "careerTitle");
    }

    #[tokio::test(start_paused = true)]
    async fn test_roadmap_failure_is_500_with_request_id() {
        let response = app(Arc::new(ScriptedModel::always_failing()))
            .oneshot(post_json(
                "/api/roadmap",
                json!({"careerTitle": "Staff Nurse", "careerDetails": {"skills": "Empathy"}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Failed to generate career roadmap");
        assert!(body["requestId"].is_string());
    }

    #[tokio::test(start_paused = true)]
    async fn test_assessment_form_submission() {
        let form = "qualification=after12th&stream=pcb&age=17&location=Beed\
                    &higherStudies=Yes&interests=biology&interests=nursing";
        let request = Request::post("/assessment/submit")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();

        let response = app(Arc::new(ScriptedModel::always_failing()))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["profile"]["qualification"], "Class 12");
        assert_eq!(body["profile"]["stream"], "Science");
        assert_eq!(body["profile"]["subjects"], "PCB");
        assert_eq!(body["profile"]["interests"], json!(["biology", "nursing"]));
        assert_eq!(body["source"], "Default Recommendations (AI Fallback)");
        assert_eq!(body["careers"][0]["title"], "Staff Nurse");
    }

    #[tokio::test]
    async fn test_legacy_submit_redirects() {
        let response = app(Arc::new(ScriptedModel::always_failing()))
            .oneshot(Request::post("/test").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/assessment/submit");
    }

    #[tokio::test]
    async fn test_search() {
        let response = app(Arc::new(ScriptedModel::always_failing()))
            .oneshot(
                Request::get("/search?q=lab%20assistant")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["query"], "lab assistant");
        assert_eq!(body["resultsCount"], 2);
        assert_eq!(body["results"][0]["title"], "Lab Assistant");
        assert_eq!(body["results"][0]["relevanceScore"], 100);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = app(Arc::new(ScriptedModel::always_failing()))
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }
}
