use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aggregator::{
    Aggregator, AggregatorConfig, AggregatorError, AskInput, DisabledWebSearch, SHORTCUT_DURATION,
    WebHit, WebSearch, WebSearchError,
};
use ai_llm_service::{AiLlmError, BoxFuture, ChatBackend, ChatMessage, ChatRequest, ChatRole};
use pretty_assertions::assert_eq;
use rag_store::{EmbeddingsProvider, RagConfig, RagError, RagStore, VectorBackend};
use request_history::HistoryStore;

const M1: &str = "worker/one";
const M2: &str = "worker/two";
const JUDGE: &str = "judge/model";

/// Answers per model id; a missing entry fails the call.
#[derive(Default)]
struct ScriptedChat {
    answers: HashMap<&'static str, String>,
    calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

impl ScriptedChat {
    fn new(answers: &[(&'static str, &str)]) -> Self {
        Self {
            answers: answers.iter().map(|(m, a)| (*m, a.to_string())).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls_to(&self, model: &str) -> Vec<Vec<ChatMessage>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == model)
            .map(|(_, msgs)| msgs.clone())
            .collect()
    }
}

impl ChatBackend for ScriptedChat {
    fn chat<'a>(&'a self, request: ChatRequest<'a>) -> BoxFuture<'a, Result<String, AiLlmError>> {
        self.calls
            .lock()
            .unwrap()
            .push((request.model.to_string(), request.messages.to_vec()));
        let out = self
            .answers
            .get(request.model)
            .cloned()
            .ok_or(AiLlmError::Timeout(Duration::from_secs(1)));
        Box::pin(async move { out })
    }
}

struct UnitEmbedder;

impl EmbeddingsProvider for UnitEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        let len = text.len() as f32;
        Box::pin(async move { Ok(vec![1.0, len]) })
    }
}

struct BrokenWeb;

impl WebSearch for BrokenWeb {
    fn search<'a>(
        &'a self,
        _query: &'a str,
        _max_results: u32,
    ) -> BoxFuture<'a, Result<Vec<WebHit>, WebSearchError>> {
        Box::pin(async {
            Err(WebSearchError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: "upstream down".into(),
            })
        })
    }
}

struct OneHitWeb;

impl WebSearch for OneHitWeb {
    fn search<'a>(
        &'a self,
        _query: &'a str,
        _max_results: u32,
    ) -> BoxFuture<'a, Result<Vec<WebHit>, WebSearchError>> {
        Box::pin(async {
            Ok(vec![WebHit {
                url: "https://news.example".into(),
                content: "fresh headline".into(),
            }])
        })
    }
}

fn config(prefix_chars: usize) -> AggregatorConfig {
    AggregatorConfig {
        primary_model: M1.into(),
        secondary_model: M2.into(),
        judge_model: JUDGE.into(),
        max_tokens: Some(10_000),
        web_top_k: 3,
        judge_prefix_chars: prefix_chars,
        tavily_api_key: None,
    }
}

fn rag() -> Arc<RagStore> {
    let mut cfg = RagConfig::new_default("http://unused", "kb");
    cfg.backend = VectorBackend::Memory;
    cfg.embedding_dim = 2;
    Arc::new(RagStore::new(cfg, Arc::new(UnitEmbedder)).unwrap())
}

struct Harness {
    chat: Arc<ScriptedChat>,
    history: HistoryStore,
    rag: Arc<RagStore>,
    aggregator: Aggregator,
}

fn harness(chat: ScriptedChat, web: Arc<dyn WebSearch>, prefix_chars: usize) -> Harness {
    let chat = Arc::new(chat);
    let history = HistoryStore::open_in_memory().unwrap();
    let rag = rag();
    let aggregator = Aggregator::new(
        config(prefix_chars),
        chat.clone(),
        rag.clone(),
        web,
        history.clone(),
    );
    Harness {
        chat,
        history,
        rag,
        aggregator,
    }
}

fn ask(question: &str) -> AskInput {
    AskInput {
        question: question.into(),
        chat_history: Vec::new(),
    }
}

#[tokio::test]
async fn successful_ask_logs_three_labelled_rows() {
    let h = harness(
        ScriptedChat::new(&[(M1, "alpha answer"), (M2, "beta answer"), (JUDGE, "merged")]),
        Arc::new(DisabledWebSearch),
        100,
    );

    let out = h.aggregator.ask(ask("What is Rust?")).await.unwrap();
    assert_eq!(out.model1.name, M1);
    assert_eq!(out.model1.answer, "alpha answer");
    assert_eq!(out.model2.answer, "beta answer");
    assert_eq!(out.final_answer, "merged");
    assert!(
        (out.total_duration - (out.model1.duration + out.model2.duration + out.judge_duration))
            .abs()
            < 1e-9
    );

    let rows = h.history.recent(10).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.question == "What is Rust?"));
    let mut labels: Vec<_> = rows.iter().map(|r| r.model_name.clone()).collect();
    labels.sort();
    assert_eq!(labels, ["judge", M1, M2]);
}

#[tokio::test]
async fn matching_prefixes_skip_the_judge_call() {
    let shared = "x".repeat(100);
    let a1 = format!("{shared} and then one thing");
    let a2 = format!("{shared} and then another");
    let h = harness(
        ScriptedChat::new(&[(M1, a1.as_str()), (M2, a2.as_str()), (JUDGE, "should not be used")]),
        Arc::new(DisabledWebSearch),
        100,
    );

    let out = h.aggregator.ask(ask("q")).await.unwrap();
    assert_eq!(out.final_answer, a1);
    assert_eq!(out.judge_duration, SHORTCUT_DURATION);
    assert!(h.chat.calls_to(JUDGE).is_empty());

    let judge_row = h
        .history
        .recent(3)
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.model_name == "judge")
        .unwrap();
    assert_eq!(judge_row.duration, 0.1);
    assert_eq!(judge_row.answer, a1);
}

#[tokio::test]
async fn zero_prefix_always_calls_the_judge() {
    let h = harness(
        ScriptedChat::new(&[(M1, "same"), (M2, "same"), (JUDGE, "judged")]),
        Arc::new(DisabledWebSearch),
        0,
    );
    let out = h.aggregator.ask(ask("q")).await.unwrap();
    assert_eq!(out.final_answer, "judged");
    assert_eq!(h.chat.calls_to(JUDGE).len(), 1);
}

#[tokio::test]
async fn web_search_failure_does_not_fail_the_request() {
    let h = harness(
        ScriptedChat::new(&[(M1, "a"), (M2, "b"), (JUDGE, "c")]),
        Arc::new(BrokenWeb),
        100,
    );
    let out = h.aggregator.ask(ask("q")).await.unwrap();
    assert_eq!(out.final_answer, "c");
    assert_eq!(h.history.count().await.unwrap(), 3);
}

#[tokio::test]
async fn worker_failure_writes_nothing() {
    let h = harness(
        ScriptedChat::new(&[(M1, "only one worker answers"), (JUDGE, "c")]),
        Arc::new(DisabledWebSearch),
        100,
    );
    let err = h.aggregator.ask(ask("q")).await.unwrap_err();
    assert!(matches!(err, AggregatorError::Llm { .. }), "got {err:?}");
    assert_eq!(h.history.count().await.unwrap(), 0);
}

#[tokio::test]
async fn judge_failure_writes_nothing() {
    let h = harness(
        ScriptedChat::new(&[(M1, "left"), (M2, "right")]),
        Arc::new(DisabledWebSearch),
        100,
    );
    let err = h.aggregator.ask(ask("q")).await.unwrap_err();
    assert!(err.to_string().contains("judge"));
    assert_eq!(h.history.count().await.unwrap(), 0);
}

#[tokio::test]
async fn both_workers_see_document_and_web_context() {
    let h = harness(
        ScriptedChat::new(&[(M1, "a"), (M2, "b"), (JUDGE, "c")]),
        Arc::new(OneHitWeb),
        100,
    );
    h.rag
        .ingest_pages(&["the vault code is 4711".to_string()], "secrets.pdf")
        .await
        .unwrap();

    h.aggregator.ask(ask("vault code?")).await.unwrap();

    for model in [M1, M2] {
        let calls = h.chat.calls_to(model);
        assert_eq!(calls.len(), 1);
        let system = &calls[0][0];
        assert_eq!(system.role, ChatRole::System);
        assert!(system.content.contains(
            "--- PDF DATA ---\nthe vault code is 4711\n\n--- WEB DATA ---\nSource: https://news.example\nContent: fresh headline"
        ));
    }
}

#[tokio::test]
async fn prior_turns_are_forwarded_to_workers() {
    let h = harness(
        ScriptedChat::new(&[(M1, "a"), (M2, "b"), (JUDGE, "c")]),
        Arc::new(DisabledWebSearch),
        100,
    );
    let input = AskInput {
        question: "and the second?".into(),
        chat_history: vec![
            ChatMessage::user("name two planets"),
            ChatMessage::assistant("Mars"),
        ],
    };
    h.aggregator.ask(input).await.unwrap();

    let msgs = &h.chat.calls_to(M2)[0];
    let contents: Vec<_> = msgs[1..].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["name two planets", "Mars", "and the second?"]);
}
