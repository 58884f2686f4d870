use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct InvalidateRequest {
    pub year: Option<i32>,
}

/// POST /api/v1/cache/invalidate
/// Drops cached tables for one year, or all years when no year is given.
pub async fn handle_invalidate(
    State(state): State<AppState>,
    body: Option<Json<InvalidateRequest>>,
) -> StatusCode {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    match req.year {
        Some(year) => {
            info!("Invalidating cached tables for {year}");
            state.catalog.invalidate_year(year).await;
        }
        None => state.catalog.invalidate().await,
    }
    StatusCode::NO_CONTENT
}
