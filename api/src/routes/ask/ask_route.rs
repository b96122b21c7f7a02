//! POST /ask: two-model answer with judge merge.

use std::sync::Arc;

use aggregator::AskInput;
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::{error, warn};

use crate::{
    core::app_state::AppState,
    routes::ask::{ask_request::AskRequest, ask_response::AskResponse},
};

/// Handler: POST /ask
///
/// Failures never change the status code: they come back as
/// `{"status":"error","error":"..."}` with HTTP 200, and nothing is logged
/// to history.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is the capital of France?"}'
/// ```
pub async fn ask(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Json<AskResponse> {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            warn!(error = %rejection, "ask: malformed body");
            return Json(AskResponse::error(rejection.body_text()));
        }
    };

    let cfg = state.aggregator.config();
    let ignored = body.ignored_fields(&cfg.primary_model, &cfg.secondary_model);
    if !ignored.is_empty() {
        warn!(fields = ?ignored, "ask: request overrides are not supported and were ignored");
    }

    let input = AskInput {
        question: body.question,
        chat_history: body.chat_history.into_iter().map(Into::into).collect(),
    };

    match state.aggregator.ask(input).await {
        Ok(outcome) => Json(AskResponse::success(outcome, ignored)),
        Err(e) => {
            error!(error = %e, "ask: pipeline failed");
            Json(AskResponse::error(e.to_string()))
        }
    }
}
