//! OpenAI-compatible client (OpenAI, OpenRouter): `/v1/chat/completions`
//! and `/v1/embeddings`, non-streaming, Bearer auth.

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    chat::ChatMessage,
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderError, ProviderErrorKind},
    services::{base_url, post_json, with_timeout},
};

#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embeddings: String,
}

impl OpenAiService {
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not OpenAI
    /// - `MissingApiKey` if `cfg.api_key` is `None`
    /// - `InvalidEndpoint` if `cfg.endpoint` has no http(s) scheme
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let provider = LlmProvider::OpenAI;
        if cfg.provider != provider {
            return Err(ProviderError::new(provider, ProviderErrorKind::InvalidProvider).into());
        }
        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::new(provider, ProviderErrorKind::MissingApiKey))?;
        let base = base_url(provider, &cfg.endpoint)?;

        let auth = header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            ProviderError::new(
                provider,
                ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
            )
        })?;
        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        let client = with_timeout(
            reqwest::Client::builder().default_headers(headers),
            cfg.timeout_secs,
        )
        .build()?;

        info!(model = %cfg.model, endpoint = %base, timeout_secs = ?cfg.timeout_secs, "OpenAiService initialized");

        Ok(Self {
            client,
            url_chat: format!("{base}/v1/chat/completions"),
            url_embeddings: format!("{base}/v1/embeddings"),
            cfg,
        })
    }

    /// `model` overrides the profile model so one client serves every model
    /// behind the same key. `max_tokens` falls back to the profile value.
    #[instrument(skip_all, fields(model = %model, messages = messages.len()))]
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: Option<u32>,
    ) -> Result<String, AiLlmError> {
        let body = ChatCompletionRequest {
            model,
            messages,
            temperature: self.cfg.temperature,
            top_p: self.cfg.top_p,
            max_tokens: max_tokens.or(self.cfg.max_tokens),
        };
        let out: ChatCompletionResponse = post_json(
            &self.client,
            LlmProvider::OpenAI,
            &self.url_chat,
            &body,
            "`choices[0].message.content`",
        )
        .await?;

        out.choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or_else(|| ProviderError::new(LlmProvider::OpenAI, ProviderErrorKind::EmptyChoices).into())
    }

    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            input,
        };
        let out: EmbeddingsResponse = post_json(
            &self.client,
            LlmProvider::OpenAI,
            &self.url_embeddings,
            &body,
            "`data[0].embedding`",
        )
        .await?;

        out.data.into_iter().next().map(|d| d.embedding).ok_or_else(|| {
            ProviderError::new(
                LlmProvider::OpenAI,
                ProviderErrorKind::Decode("empty `data` in embeddings response".into()),
            )
            .into()
        })
    }
}

/// Request body for `/v1/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Minimal response for `/v1/chat/completions`.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

/// Request body for `/v1/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response body for `/v1/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatMessage;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "google/gemma-3-27b-it:free".into(),
            endpoint: "https://openrouter.ai/api/".into(),
            api_key: Some("sk-or-test".into()),
            max_tokens: Some(10_000),
            temperature: None,
            top_p: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn urls_are_derived_from_endpoint() {
        let svc = OpenAiService::new(cfg()).unwrap();
        assert_eq!(svc.url_chat, "https://openrouter.ai/api/v1/chat/completions");
        assert_eq!(svc.url_embeddings, "https://openrouter.ai/api/v1/embeddings");
    }

    #[test]
    fn missing_key_is_rejected() {
        let mut c = cfg();
        c.api_key = None;
        let err = OpenAiService::new(c).unwrap_err();
        assert!(err.to_string().contains("API key is missing"));
    }

    #[test]
    fn request_body_matches_openai_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = ChatCompletionRequest {
            model: "m",
            messages: &messages,
            temperature: None,
            top_p: None,
            max_tokens: Some(10_000),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "m",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hi"}
                ],
                "max_tokens": 10000
            })
        );
    }
}
