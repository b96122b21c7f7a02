//! Answer generator: one worker completion over the shared context.

use std::sync::Arc;
use std::time::Instant;

use ai_llm_service::{AiLlmError, ChatBackend, ChatMessage, ChatRequest};
use tracing::{debug, instrument};

/// Used in place of a blank context block.
pub const EMPTY_CONTEXT_PLACEHOLDER: &str = "No specific context from PDF or Web was found.";

/// Generated text with the wall-clock seconds it took.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedAnswer {
    pub text: String,
    pub duration: f64,
}

/// System instructions for a worker, with today's date and the context inlined.
pub fn system_prompt(date: &str, context: &str) -> String {
    let context = if context.trim().is_empty() {
        EMPTY_CONTEXT_PLACEHOLDER
    } else {
        context
    };
    format!(
        "You are a high-level AI Assistant. Today is {date}.

INSTRUCTIONS:
1. Use the [CONTEXT] section below to answer. It contains data from user files and the internet.
2. If the [CONTEXT] is unrelated to the question, answer using your general knowledge.
3. Never say you don't have internet access, as relevant web data is already provided in the context.
4. If the user asks about personal data or files, use ONLY [PDF DATA]. Do not mix it with internet news unless explicitly asked.
5. DO NOT hallucinate connections between PDF data and Web news if they are unrelated.

[CONTEXT]:
{context}"
    )
}

/// Message list: system, prior turns, then the question.
pub fn build_messages(
    date: &str,
    context: &str,
    history: &[ChatMessage],
    question: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system_prompt(date, context)));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(question));
    messages
}

/// Today's date as `19 October 2026`.
pub fn today() -> String {
    chrono::Local::now().format("%d %B %Y").to_string()
}

pub struct AnswerGenerator {
    backend: Arc<dyn ChatBackend>,
    max_tokens: Option<u32>,
}

impl AnswerGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>, max_tokens: Option<u32>) -> Self {
        Self {
            backend,
            max_tokens,
        }
    }

    #[instrument(skip_all, fields(model = %model))]
    pub async fn generate(
        &self,
        model: &str,
        question: &str,
        history: &[ChatMessage],
        context: &str,
    ) -> Result<TimedAnswer, AiLlmError> {
        let started = Instant::now();
        let messages = build_messages(&today(), context, history, question);

        let text = self
            .backend
            .chat(ChatRequest {
                model,
                messages: &messages,
                max_tokens: self.max_tokens,
            })
            .await?;

        let duration = started.elapsed().as_secs_f64();
        debug!(latency_ms = (duration * 1000.0) as u64, chars = text.len(), "answer generated");
        Ok(TimedAnswer { text, duration })
    }
}
