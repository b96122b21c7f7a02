use serde::Serialize;

/// Label stored in `model_name` for the merged answer.
pub const JUDGE_LABEL: &str = "judge";

/// One row of `requests_history`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub id: i64,
    /// `YYYY-MM-DD HH:MM:SS`, UTC, assigned by SQLite.
    pub timestamp: String,
    pub question: String,
    pub model_name: String,
    pub answer: String,
    /// Seconds.
    pub duration: f64,
}

/// A produced answer waiting to be logged.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnswer {
    pub model_name: String,
    pub answer: String,
    pub duration: f64,
}

impl NewAnswer {
    pub fn new(model_name: impl Into<String>, answer: impl Into<String>, duration: f64) -> Self {
        Self {
            model_name: model_name.into(),
            answer: answer.into(),
            duration,
        }
    }
}

/// Per-model aggregate, ordered by `request_count` descending in listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStats {
    pub model: String,
    pub request_count: u64,
    pub avg_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoryStats {
    pub models: Vec<ModelStats>,
    /// Sum of `request_count` over all models.
    pub total_requests: u64,
}
