//! Ollama client: non-streaming `/api/chat` and `/api/embeddings`.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    chat::ChatMessage,
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderError, ProviderErrorKind},
    services::{base_url, post_json, with_timeout},
};

#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embeddings: String,
}

impl OllamaService {
    /// # Errors
    /// `InvalidProvider` / `InvalidEndpoint`, or a transport error if the
    /// HTTP client cannot be built.
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(
                ProviderError::new(LlmProvider::Ollama, ProviderErrorKind::InvalidProvider).into(),
            );
        }
        let base = base_url(LlmProvider::Ollama, &cfg.endpoint)?;
        let client =
            with_timeout(reqwest::Client::builder().gzip(true).brotli(true), cfg.timeout_secs)
                .build()?;

        Ok(Self {
            client,
            url_chat: format!("{base}/api/chat"),
            url_embeddings: format!("{base}/api/embeddings"),
            cfg,
        })
    }

    /// `max_tokens` maps to Ollama's `num_predict`; sampling comes from the profile.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: Option<u32>,
    ) -> Result<String, AiLlmError> {
        let body = OllamaChat {
            model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.cfg.temperature,
                top_p: self.cfg.top_p,
                num_predict: max_tokens.or(self.cfg.max_tokens),
            },
        };
        let out: OllamaChatReply = post_json(
            &self.client,
            LlmProvider::Ollama,
            &self.url_chat,
            &body,
            "`message.content` (stream=false)",
        )
        .await?;
        Ok(out.message.content)
    }

    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let body = OllamaEmbed {
            model: &self.cfg.model,
            prompt: input,
        };
        let out: OllamaEmbedReply = post_json(
            &self.client,
            LlmProvider::Ollama,
            &self.url_embeddings,
            &body,
            "`embedding: number[]`",
        )
        .await?;
        Ok(out.embedding)
    }
}

#[derive(Debug, Serialize)]
struct OllamaChat<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Default, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatReply {
    message: OllamaReplyMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaReplyMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaEmbed<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedReply {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "all-minilm".into(),
            endpoint: "http://localhost:11434/".into(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.5),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn urls_use_api_prefix() {
        let svc = OllamaService::new(cfg()).unwrap();
        assert_eq!(svc.url_chat, "http://localhost:11434/api/chat");
        assert_eq!(svc.url_embeddings, "http://localhost:11434/api/embeddings");
    }

    #[test]
    fn chat_body_disables_streaming() {
        let messages = vec![ChatMessage::user("hi")];
        let body = OllamaChat {
            model: "llama3",
            messages: &messages,
            stream: false,
            options: OllamaOptions {
                temperature: Some(0.5),
                top_p: None,
                num_predict: Some(64),
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "llama3",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": false,
                "options": {"temperature": 0.5, "num_predict": 64}
            })
        );
    }
}
