use aggregator::{AskOutcome, ModelAnswer};
use serde::Serialize;

use crate::routes::format_duration;

/// Response payload for /ask. Always sent with HTTP 200.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AskResponse {
    Success(AskSuccess),
    Error(AskFailure),
}

#[derive(Debug, Serialize)]
pub struct AskSuccess {
    pub status: &'static str,
    pub question: String,
    pub model1: ModelAnswerDto,
    pub model2: ModelAnswerDto,
    pub final_answer: String,
    pub total_duration: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_fields: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ModelAnswerDto {
    pub name: String,
    pub answer: String,
    pub duration: String,
}

#[derive(Debug, Serialize)]
pub struct AskFailure {
    pub status: &'static str,
    pub error: String,
}

impl From<ModelAnswer> for ModelAnswerDto {
    fn from(m: ModelAnswer) -> Self {
        Self {
            name: m.name,
            answer: m.answer,
            duration: format_duration(m.duration),
        }
    }
}

impl AskResponse {
    pub fn success(outcome: AskOutcome, ignored_fields: Vec<&'static str>) -> Self {
        Self::Success(AskSuccess {
            status: "success",
            question: outcome.question,
            model1: outcome.model1.into(),
            model2: outcome.model2.into(),
            final_answer: outcome.final_answer,
            total_duration: format_duration(outcome.total_duration),
            ignored_fields,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(AskFailure {
            status: "error",
            error: message.into(),
        })
    }
}
