use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::ranking::interpolate::RankEstimate;
use crate::ranking::service::{
    self, BatchRankResult, RankQueryResult, TrendReport, YearStatistics,
};
use crate::ranking::table::Population;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RankRequest {
    pub score: f64,
    pub year: Option<i32>,
}

#[derive(Deserialize)]
pub struct EstimateRequest {
    pub score: f64,
    pub year: Option<i32>,
    pub population: Population,
}

#[derive(Deserialize)]
pub struct BatchRankRequest {
    pub scores: Vec<f64>,
    pub year: Option<i32>,
}

#[derive(Deserialize)]
pub struct TrendQuery {
    pub score: f64,
    /// Comma-separated years, e.g. `2022,2023,2024`.
    pub years: Option<String>,
}

#[derive(Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// POST /api/v1/rank
pub async fn handle_rank(
    State(state): State<AppState>,
    AppJson(req): AppJson<RankRequest>,
) -> Result<Json<RankQueryResult>, AppError> {
    let year = req.year.unwrap_or(state.config.default_year);
    let result = service::query_rank(&state.catalog, req.score, year).await?;
    Ok(Json(result))
}

/// POST /api/v1/rank/estimate
/// Rank within a single population, with the method used to reach it.
pub async fn handle_estimate(
    State(state): State<AppState>,
    AppJson(req): AppJson<EstimateRequest>,
) -> Result<Json<RankEstimate>, AppError> {
    let year = req.year.unwrap_or(state.config.default_year);
    let estimate = service::rank(&state.catalog, req.score, year, req.population).await?;
    Ok(Json(estimate))
}

/// POST /api/v1/rank/batch
pub async fn handle_rank_batch(
    State(state): State<AppState>,
    AppJson(req): AppJson<BatchRankRequest>,
) -> Result<Json<BatchRankResult>, AppError> {
    if req.scores.is_empty() {
        return Err(AppError::Validation("scores must not be empty".to_string()));
    }
    let year = req.year.unwrap_or(state.config.default_year);
    let result = service::rank_batch(&state.catalog, &req.scores, year).await?;
    Ok(Json(result))
}

/// GET /api/v1/rank/trend
pub async fn handle_trend(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<TrendQuery>,
) -> Result<Json<TrendReport>, AppError> {
    let years = params.years.as_deref().map(parse_years).transpose()?;
    let report = service::trend(&state.catalog, params.score, years).await?;
    Ok(Json(report))
}

/// GET /api/v1/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<YearQuery>,
) -> Result<Json<YearStatistics>, AppError> {
    let year = params.year.unwrap_or(state.config.default_year);
    Ok(Json(service::statistics(&state.catalog, year).await?))
}

/// GET /api/v1/years
pub async fn handle_years(State(state): State<AppState>) -> Result<Json<Vec<i32>>, AppError> {
    Ok(Json(state.catalog.years().await?))
}

fn parse_years(raw: &str) -> Result<Vec<i32>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| AppError::Validation(format!("'{s}' is not a valid year")))
        })
        .collect()
}
