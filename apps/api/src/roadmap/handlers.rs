use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, FieldError};
use crate::models::career::{CareerDetails, RoadmapRecord};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapRequest {
    #[serde(default)]
    pub career_title: String,
    #[serde(default)]
    pub career_details: Option<CareerDetails>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapResponse {
    pub success: bool,
    pub roadmap: RoadmapRecord,
    pub request_id: String,
}

/// POST /api/roadmap
pub async fn handle_roadmap(
    State(state): State<AppState>,
    body: Result<Json<RoadmapRequest>, JsonRejection>,
) -> Result<Json<RoadmapResponse>, AppError> {
    let Json(req) = body.map_err(|rejection| {
        AppError::Validation(vec![FieldError::new("body", rejection.body_text())])
    })?;
    let title = req.career_title.trim();
    if title.is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "careerTitle",
            "Career title is required",
        )]));
    }

    let request_id = Uuid::new_v4().to_string();
    let roadmap = state
        .planner
        .get_roadmap(title, req.career_details.as_ref(), &request_id)
        .await
        .ok_or_else(|| AppError::Upstream {
            message: "Failed to generate career roadmap".to_string(),
            request_id: request_id.clone(),
        })?;

    Ok(Json(RoadmapResponse {
        success: true,
        roadmap,
        request_id,
    }))
}
