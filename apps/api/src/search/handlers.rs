use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::search::engine::{search, ScoredCareer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<ScoredCareer>,
    pub results_count: usize,
}

/// GET /search?q=
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let results = search(&state.catalog, &params.q);
    info!(query = %params.q, count = results.len(), "Career search");

    Json(SearchResponse {
        results_count: results.len(),
        query: params.q,
        results,
    })
}
