use std::sync::Arc;

use axum::{Json, extract::State};
use request_history::JUDGE_LABEL;
use serde::Serialize;

use crate::core::app_state::AppState;

const FEATURES: [&str; 4] = [
    "Answers from two models merged by a judge",
    "PDF knowledge base with vector search",
    "Web search context",
    "Request history and per-model statistics",
];

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub available_models: Vec<String>,
    pub features: Vec<&'static str>,
}

/// Handler: GET /info
pub async fn info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let cfg = state.aggregator.config();
    Json(InfoResponse {
        name: "AI Aggregator API",
        version: "1.0",
        available_models: vec![
            cfg.primary_model.clone(),
            cfg.secondary_model.clone(),
            format!("{} ({JUDGE_LABEL})", cfg.judge_model),
        ],
        features: FEATURES.to_vec(),
    })
}
