use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, FieldError};
use crate::models::career::CareerRecord;
use crate::models::profile::UserProfile;
use crate::recommendation::normalizer::{normalize, RawProfileInput};
use crate::recommendation::resolver::{resolve_recommendations, RecommendationSource};
use crate::recommendation::validation::validate_recommendation_request;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub success: bool,
    pub careers: Vec<CareerRecord>,
    pub source: RecommendationSource,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub request_id: String,
    pub profile: UserProfile,
    pub source: RecommendationSource,
    pub careers: Vec<CareerRecord>,
}

/// POST /api/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    body: Result<Json<RawProfileInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(raw) = body.map_err(|rejection| {
        AppError::Validation(vec![FieldError::new("body", rejection.body_text())])
    })?;
    validate_recommendation_request(&raw).map_err(AppError::Validation)?;

    let request_id = Uuid::new_v4().to_string();
    let profile = normalize(&raw);
    info!(request_id = %request_id, qualification = profile.qualification.label(), "Recommendation request");

    let outcome =
        resolve_recommendations(&state.advisor, &state.catalog, &profile, &request_id).await;

    let source = outcome.source;
    let mut response = Json(RecommendationsResponse {
        success: true,
        careers: outcome.careers,
        source,
        request_id,
    })
    .into_response();

    // A fallback answer must not outlive the model outage that caused it.
    if source != RecommendationSource::Ai {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    Ok(response)
}

/// POST /assessment/submit
/// Form submissions are not validated; the normalizer fills in defaults.
pub async fn handle_assessment_submit(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Json<AssessmentResponse> {
    let request_id = Uuid::new_v4().to_string();
    let profile = normalize(&RawProfileInput::from_form_pairs(pairs));
    info!(request_id = %request_id, qualification = profile.qualification.label(), "Assessment submitted");

    let outcome =
        resolve_recommendations(&state.advisor, &state.catalog, &profile, &request_id).await;

    Json(AssessmentResponse {
        request_id,
        profile,
        source: outcome.source,
        careers: outcome.careers,
    })
}

/// POST /test
/// Older form target, kept as a redirect that preserves method and body.
pub async fn handle_legacy_submit() -> Redirect {
    Redirect::temporary("/assessment/submit")
}
