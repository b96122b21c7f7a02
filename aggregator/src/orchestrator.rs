//! Request orchestration: context → two answers → judge → history.

use std::sync::Arc;

use ai_llm_service::{ChatBackend, ChatMessage};
use rag_store::RagStore;
use request_history::{HistoryStore, JUDGE_LABEL, NewAnswer};
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::AggregatorConfig;
use crate::context::{gather_context, web_search::WebSearch};
use crate::error::AggregatorError;
use crate::generator::AnswerGenerator;
use crate::judge::Judge;

/// One orchestrated question.
#[derive(Debug, Clone, Default)]
pub struct AskInput {
    pub question: String,
    /// Prior conversation turns, oldest first.
    pub chat_history: Vec<ChatMessage>,
}

/// One worker's answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAnswer {
    pub name: String,
    pub answer: String,
    /// Seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskOutcome {
    pub question: String,
    pub model1: ModelAnswer,
    pub model2: ModelAnswer,
    pub final_answer: String,
    pub judge_duration: f64,
    /// Sum of the two worker durations and the judge duration.
    pub total_duration: f64,
}

pub struct Aggregator {
    cfg: AggregatorConfig,
    rag: Arc<RagStore>,
    web: Arc<dyn WebSearch>,
    history: HistoryStore,
    generator: AnswerGenerator,
    judge: Judge,
}

impl Aggregator {
    pub fn new(
        cfg: AggregatorConfig,
        chat: Arc<dyn ChatBackend>,
        rag: Arc<RagStore>,
        web: Arc<dyn WebSearch>,
        history: HistoryStore,
    ) -> Self {
        let generator = AnswerGenerator::new(Arc::clone(&chat), cfg.max_tokens);
        let judge = Judge::new(
            chat,
            cfg.judge_model.clone(),
            cfg.judge_prefix_chars,
            cfg.max_tokens,
        );
        Self {
            cfg,
            rag,
            web,
            history,
            generator,
            judge,
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.cfg
    }

    /// Runs the full pipeline. Nothing is written unless all three answers exist.
    #[instrument(skip_all, fields(question_chars = input.question.len()))]
    pub async fn ask(&self, input: AskInput) -> Result<AskOutcome, AggregatorError> {
        let question = input.question.as_str();
        let m1 = self.cfg.primary_model.as_str();
        let m2 = self.cfg.secondary_model.as_str();

        info!(stage = "gathering-context");
        let context =
            gather_context(&self.rag, self.web.as_ref(), question, self.cfg.web_top_k).await?;

        info!(stage = "generating-answers", model1 = m1, model2 = m2);
        let (a1, a2) = tokio::try_join!(
            async {
                self.generator
                    .generate(m1, question, &input.chat_history, &context)
                    .await
                    .map_err(AggregatorError::llm("model1 answer"))
            },
            async {
                self.generator
                    .generate(m2, question, &input.chat_history, &context)
                    .await
                    .map_err(AggregatorError::llm("model2 answer"))
            },
        )?;

        info!(stage = "judging", judge = self.judge.model());
        let merged = self
            .judge
            .merge(question, &a1.text, &a2.text)
            .await
            .map_err(AggregatorError::llm("judge"))?;

        info!(stage = "persisting");
        self.history
            .record_exchange(
                question,
                vec![
                    NewAnswer::new(m1, a1.text.clone(), a1.duration),
                    NewAnswer::new(m2, a2.text.clone(), a2.duration),
                    NewAnswer::new(JUDGE_LABEL, merged.text.clone(), merged.duration),
                ],
            )
            .await?;

        let total_duration = a1.duration + a2.duration + merged.duration;
        info!(stage = "responding", total_duration);

        Ok(AskOutcome {
            question: input.question.clone(),
            model1: ModelAnswer {
                name: m1.to_string(),
                answer: a1.text,
                duration: a1.duration,
            },
            model2: ModelAnswer {
                name: m2.to_string(),
                answer: a2.text,
                duration: a2.duration,
            },
            final_answer: merged.text,
            judge_duration: merged.duration,
            total_duration,
        })
    }
}
