use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use aggregator::AggregatorError;
use ai_llm_service::AiLlmError;
use rag_store::RagError;
use request_history::HistoryError;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("configuration error: {0}")]
    Config(String),

    // --- IO / network / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            AppError::Config(_) | AppError::Bind { .. } | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(err: axum::extract::rejection::QueryRejection) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Http {
            status: err.status(),
            code: "MULTIPART_ERROR",
            message: err.body_text(),
        }
    }
}

impl From<AiLlmError> for AppError {
    fn from(err: AiLlmError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Knowledge-base failures: bad documents are the caller's problem,
/// embedding and vector-store failures are upstream problems.
impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        let (status, code) = match &err {
            RagError::Pdf(_) => (StatusCode::UNPROCESSABLE_ENTITY, "PDF_UNREADABLE"),
            RagError::Embedding(_) => (StatusCode::BAD_GATEWAY, "EMBEDDING_FAILED"),
            RagError::Qdrant(_) => (StatusCode::BAD_GATEWAY, "VECTOR_STORE_FAILED"),
            RagError::VectorSizeMismatch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "EMBEDDING_DIM_MISMATCH")
            }
            RagError::Io(_) | RagError::Join(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            RagError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        };
        AppError::Http {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        AppError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "HISTORY_ERROR",
            message: err.to_string(),
        }
    }
}

impl From<AggregatorError> for AppError {
    fn from(err: AggregatorError) -> Self {
        match err {
            AggregatorError::Config(msg) => AppError::Config(msg),
            other => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "AGGREGATION_FAILED",
                message: other.to_string(),
            },
        }
    }
}
