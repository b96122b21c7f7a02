//! GET /stats, GET /history, DELETE /clear.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use tracing::info;

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::history::history_response::{
        ClearResponse, HistoryQuery, HistoryResponse, StatsResponse,
    },
};

/// Handler: GET /stats: per-model counts and durations, busiest first.
pub async fn stats(State(state): State<Arc<AppState>>) -> AppResult<Json<StatsResponse>> {
    let stats = state.history.stats().await?;
    Ok(Json(stats.into()))
}

/// Handler: GET /history?limit=N: newest rows first (default 10).
pub async fn history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> AppResult<Json<HistoryResponse>> {
    let Query(q) = query?;
    let rows = state.history.recent(q.limit).await?;
    Ok(Json(HistoryResponse {
        history: rows.into_iter().map(Into::into).collect(),
    }))
}

/// Handler: DELETE /clear: removes every history row.
pub async fn clear(State(state): State<Arc<AppState>>) -> AppResult<Json<ClearResponse>> {
    let removed = state.history.clear().await?;
    info!(removed, "clear: history wiped");
    Ok(Json(ClearResponse {
        message: "History was cleared",
    }))
}
