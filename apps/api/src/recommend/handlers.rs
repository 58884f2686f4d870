use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::recommend::service::{recommend, RecommendationResult};
use crate::state::AppState;

const DEFAULT_SCHEME: [i64; 3] = [5, 6, 5];

#[derive(Deserialize)]
pub struct RecommendRequest {
    /// Candidate's narrow-population rank.
    pub rank: i64,
    pub year: Option<i32>,
    /// `[reach, match, safety]` bucket sizes.
    pub scheme: Option<[i64; 3]>,
}

/// POST /api/v1/recommend
pub async fn handle_recommend(
    State(state): State<AppState>,
    AppJson(req): AppJson<RecommendRequest>,
) -> Result<Json<RecommendationResult>, AppError> {
    let year = req.year.unwrap_or(state.config.default_year);
    let [reach, matched, safety] = req.scheme.unwrap_or(DEFAULT_SCHEME);
    let result = recommend(&state.catalog, req.rank, year, (reach, matched, safety)).await?;
    Ok(Json(result))
}
