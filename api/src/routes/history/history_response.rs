use request_history::{HistoryRecord, HistoryStats, ModelStats};
use serde::{Deserialize, Serialize};

use crate::routes::format_duration;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub statistics: Vec<ModelStatsDto>,
    pub total_requests: u64,
}

#[derive(Debug, Serialize)]
pub struct ModelStatsDto {
    pub model: String,
    pub request_count: u64,
    pub avg_duration: String,
    pub min_duration: String,
    pub max_duration: String,
}

impl From<ModelStats> for ModelStatsDto {
    fn from(m: ModelStats) -> Self {
        Self {
            model: m.model,
            request_count: m.request_count,
            avg_duration: format_duration(m.avg_duration),
            min_duration: format_duration(m.min_duration),
            max_duration: format_duration(m.max_duration),
        }
    }
}

impl From<HistoryStats> for StatsResponse {
    fn from(s: HistoryStats) -> Self {
        Self {
            statistics: s.models.into_iter().map(Into::into).collect(),
            total_requests: s.total_requests,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntryDto>,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryDto {
    pub timestamp: String,
    pub question: String,
    pub model: String,
    pub duration: String,
}

impl From<HistoryRecord> for HistoryEntryDto {
    fn from(r: HistoryRecord) -> Self {
        Self {
            timestamp: r.timestamp,
            question: r.question,
            model: r.model_name,
            duration: format_duration(r.duration),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: &'static str,
}
