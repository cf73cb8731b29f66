//! HTTP request handlers

use super::error::ApiError;
use super::state::AppState;
use crate::search::{SearchRequest, SearchResponse};
use crate::storage::RecentSearch;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;
use tracing::info;

/// Default number of entries returned by `/api/recent-searches`
const DEFAULT_RECENT_LIMIT: usize = 10;

/// Query parameters for recent searches
#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<usize>,
}

/// Welcome payload
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": format!("Welcome to {}", state.project_name()),
        "version": crate::VERSION,
        "docs_url": "/api/docs",
        "redoc_url": "/api/redoc"
    }))
}

/// Route listing served at the documentation locations
pub async fn docs(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "title": state.project_name(),
        "version": crate::VERSION,
        "routes": [
            {
                "method": "POST",
                "path": "/api/search",
                "body": {
                    "asset_description": "string (required, non-empty)",
                    "max_results": "integer 1-100 (optional, default 10)"
                },
                "returns": "query, total_results, results, execution_time, timestamp"
            },
            {
                "method": "GET",
                "path": "/api/recent-searches",
                "query": {"limit": "integer (optional, default 10)"},
                "returns": "[{query, timestamp, result_count}]"
            },
            {"method": "GET", "path": "/api/stats", "returns": "per-website diagnostics"},
            {"method": "GET", "path": "/health", "returns": "service status"}
        ],
        "target_websites": state.search.websites(),
    }))
}

/// Search for construction assets across the target websites.
///
/// Listings are truncated to `max_results` and persisted before the response
/// is sent; `execution_time` covers the website searches only.
pub async fn search_assets(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = payload.map_err(|r| ApiError::rejected(r.status(), r.body_text()))?;
    request.validate().map_err(ApiError::validation)?;

    let start = Instant::now();
    let mut outcome = state
        .search
        .search_all_websites(&request.asset_description)
        .await;
    let execution_time = start.elapsed().as_secs_f64();

    if let Some(max) = request.limit() {
        outcome.truncate(max);
    }
    let results = outcome.into_results();

    let saved = state
        .storage
        .save_results(&request.asset_description, &results)
        .await
        .map_err(ApiError::search)?;
    info!(
        "Search '{}' returned {} results in {:.2}s (record {})",
        request.asset_description,
        results.len(),
        execution_time,
        saved.json_path.display()
    );

    Ok(Json(SearchResponse::new(
        request.asset_description,
        results,
        execution_time,
    )))
}

/// Summaries of the most recent stored searches, newest first
pub async fn recent_searches(
    State(state): State<AppState>,
    params: Result<Query<RecentParams>, QueryRejection>,
) -> Result<Json<Vec<RecentSearch>>, ApiError> {
    let Query(params) = params.map_err(|r| ApiError::rejected(r.status(), r.body_text()))?;
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);

    let recent = state
        .storage
        .get_recent_searches(limit)
        .await
        .map_err(ApiError::recent_searches)?;
    Ok(Json(recent))
}

/// Per-website diagnostics
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "total_searches": state.metrics.get_total_searches(),
        "websites": state.metrics.get_site_stats(),
    }))
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}
