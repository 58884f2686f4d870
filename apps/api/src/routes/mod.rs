pub mod cache;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ranking::handlers as rank_handlers;
use crate::recommend::handlers as recommend_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/years", get(rank_handlers::handle_years))
        // Rank queries
        .route("/api/v1/rank", post(rank_handlers::handle_rank))
        .route("/api/v1/rank/estimate", post(rank_handlers::handle_estimate))
        .route("/api/v1/rank/batch", post(rank_handlers::handle_rank_batch))
        .route("/api/v1/rank/trend", get(rank_handlers::handle_trend))
        .route("/api/v1/stats", get(rank_handlers::handle_stats))
        // Recommendations
        .route(
            "/api/v1/recommend",
            post(recommend_handlers::handle_recommend),
        )
        .route("/api/v1/cache/invalidate", post(cache::handle_invalidate))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::catalog::tests::sample_catalog;
    use crate::config::{Config, DatasetSource};

    fn app() -> Router {
        let state = AppState {
            catalog: Arc::new(sample_catalog()),
            config: Config {
                dataset: DatasetSource::File {
                    path: "unused.json".into(),
                },
                default_year: 2024,
                port: 0,
                db_max_connections: 1,
                rust_log: "info".into(),
                warm_cache: false,
            },
        };
        build_router(state)
    }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_rank_uses_default_year() {
        let (status, body) = send(post_json("/api/v1/rank", json!({"score": 750}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["year"], 2024);
        assert_eq!(body["rank_wide"], 501);
        assert_eq!(body["method"]["kind"], "interpolated");
        assert_eq!(body["score"], 750.0);
        assert_eq!(body["analysis"]["label"], "Excellent");
        assert!(body["analysis"]["description"].is_string());
    }

    #[tokio::test]
    async fn test_rank_invalid_score_is_400() {
        let (status, body) =
            send(post_json("/api/v1/rank", json!({"score": 750.123}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_rank_unknown_year_is_404() {
        let (status, body) = send(post_json(
            "/api/v1/rank",
            json!({"score": 700, "year": 1999}),
        ))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_estimate_single_population() {
        let (status, body) = send(post_json(
            "/api/v1/rank/estimate",
            json!({"score": 700, "population": "narrow"}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rank"], 400);
        assert_eq!(body["method"]["kind"], "exact_match");

        let (status, body) = send(post_json(
            "/api/v1/rank/estimate",
            json!({"score": 700, "population": "everyone"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_requests_use_error_body() {
        let req = Request::post("/api/v1/rank")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(post_json("/api/v1/recommend", json!({"year": 2024}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(get_req("/api/v1/rank/trend?score=high")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_batch() {
        let (status, body) = send(post_json(
            "/api/v1/rank/batch",
            json!({"scores": [700, -1]}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
        assert_eq!(body["rejected"].as_array().unwrap().len(), 1);

        let (status, _) =
            send(post_json("/api/v1/rank/batch", json!({"scores": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_trend_and_stats_and_years() {
        let (status, body) = send(get_req("/api/v1/rank/trend?score=700&years=2023,2024")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["points"].as_array().unwrap().len(), 2);

        let (status, body) = send(get_req("/api/v1/stats?year=2024")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_wide"], 5000);

        let (status, body) = send(get_req("/api/v1/years")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([2023, 2024]));
    }

    #[tokio::test]
    async fn test_recommend() {
        let (status, body) = send(post_json(
            "/api/v1/recommend",
            json!({"rank": 10000, "scheme": [5, 6, 5]}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reach"].as_array().unwrap().len(), 2);
        assert_eq!(body["match"].as_array().unwrap().len(), 2);
        assert_eq!(body["safety"][0]["name"], "Ershi");
        assert_eq!(body["total_schools"], 5);
    }

    #[tokio::test]
    async fn test_recommend_rejects_bad_rank() {
        let (status, _) =
            send(post_json("/api/v1/recommend", json!({"rank": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalidate_with_and_without_body() {
        let (status, _) = send(post_json(
            "/api/v1/cache/invalidate",
            json!({"year": 2024}),
        ))
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let req = Request::post("/api/v1/cache/invalidate")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
