//! Judge: merges two worker answers into one final answer.

use std::sync::Arc;
use std::time::Instant;

use ai_llm_service::{AiLlmError, ChatBackend, ChatMessage, ChatRequest};
use tracing::{debug, info, instrument};

use crate::generator::TimedAnswer;

/// Duration reported when the merge call is skipped.
pub const SHORTCUT_DURATION: f64 = 0.1;

/// Merge prompt sent as a single user message.
pub fn merge_prompt(question: &str, answer1: &str, answer2: &str) -> String {
    format!(
        "You are an expert who analyzes AI answers.

Question: {question}

ANSWER 1:
{answer1}

ANSWER 2:
{answer2}

Task:
Using the two answers above, produce one single, high-quality and concise final answer. Do not explain your reasoning, do not compare the answers, and do not mention which parts you selected. Simply provide the best possible final answer.

FINAL ANSWER:
"
    )
}

/// True when the first `n` characters of both answers are identical.
/// Answers shorter than `n` compare in full. `n == 0` never matches.
pub fn shares_prefix(a: &str, b: &str, n: usize) -> bool {
    n > 0 && a.chars().take(n).eq(b.chars().take(n))
}

pub struct Judge {
    backend: Arc<dyn ChatBackend>,
    model: String,
    prefix_chars: usize,
    max_tokens: Option<u32>,
}

impl Judge {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        model: impl Into<String>,
        prefix_chars: usize,
        max_tokens: Option<u32>,
    ) -> Self {
        Self {
            backend,
            model: model.into(),
            prefix_chars,
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    pub async fn merge(
        &self,
        question: &str,
        answer1: &str,
        answer2: &str,
    ) -> Result<TimedAnswer, AiLlmError> {
        if shares_prefix(answer1, answer2, self.prefix_chars) {
            info!(prefix_chars = self.prefix_chars, "answers agree, judge call skipped");
            return Ok(TimedAnswer {
                text: answer1.to_string(),
                duration: SHORTCUT_DURATION,
            });
        }

        let started = Instant::now();
        let messages = [ChatMessage::user(merge_prompt(question, answer1, answer2))];
        let text = self
            .backend
            .chat(ChatRequest {
                model: &self.model,
                messages: &messages,
                max_tokens: self.max_tokens,
            })
            .await?;

        let duration = started.elapsed().as_secs_f64();
        debug!(latency_ms = (duration * 1000.0) as u64, "answers merged");
        Ok(TimedAnswer { text, duration })
    }
}
