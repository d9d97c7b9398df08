//! HTTP handlers for the ranking service

use crate::queue::SqliteQueue;
use crate::ranker::engine::{RankerEngine, SearchResult};
use crate::storage::SqliteMetadataStore;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// The concrete engine the service runs against
pub type ServiceEngine = RankerEngine<SqliteMetadataStore, SqliteQueue>;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ServiceEngine>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Serialize)]
pub struct SearchMeta {
    pub count: usize,
    pub latency_ms: f64,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub meta: SearchMeta,
}

/// Builds the service router
pub fn build_router(engine: ServiceEngine) -> Router {
    let state = AppState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/health", get(handle_health))
        .route("/search", get(handle_search))
        .with_state(state)
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "ranker",
    })
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = Instant::now();

    let outcome = state.engine.search(&params.q).map_err(|e| {
        tracing::error!("Search for {:?} failed: {}", params.q, e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    tracing::debug!(
        "Query {:?}: {} results in {:.2}ms (cached: {})",
        params.q,
        outcome.results.len(),
        latency_ms,
        outcome.cached
    );

    Ok(Json(SearchResponse {
        query: params.q,
        meta: SearchMeta {
            count: outcome.results.len(),
            latency_ms: (latency_ms * 100.0).round() / 100.0,
        },
        results: outcome.results,
    }))
}
