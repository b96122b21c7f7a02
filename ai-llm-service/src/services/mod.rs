pub mod ollama_service;
pub mod open_ai_service;

use std::time::{Duration, Instant};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    config::llm_provider::LlmProvider,
    error_handler::{AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet},
};

/// Normalized `scheme://host[/prefix]` without a trailing slash.
pub(crate) fn base_url(provider: LlmProvider, endpoint: &str) -> Result<String, AiLlmError> {
    let endpoint = endpoint.trim();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::InvalidEndpoint(endpoint.to_string()),
        )
        .into());
    }
    Ok(endpoint.trim_end_matches('/').to_string())
}

/// Applies the optional per-profile timeout.
pub(crate) fn with_timeout(
    builder: reqwest::ClientBuilder,
    timeout_secs: Option<u64>,
) -> reqwest::ClientBuilder {
    match timeout_secs {
        Some(secs) => builder.timeout(Duration::from_secs(secs)),
        None => builder,
    }
}

/// POSTs `body` as JSON and decodes the 2xx response as `R`.
///
/// Non-2xx statuses become [`ProviderErrorKind::HttpStatus`] with a trimmed
/// body snippet; undecodable bodies become [`ProviderErrorKind::Decode`]
/// mentioning `expect`.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    provider: LlmProvider,
    url: &str,
    body: &B,
    expect: &str,
) -> Result<R, AiLlmError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let started = Instant::now();
    debug!(?provider, %url, "POST");

    let resp = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| transport_error(e, started))?;
    let status = resp.status();
    if !status.is_success() {
        let snippet = make_snippet(&resp.text().await.unwrap_or_default());
        warn!(
            ?provider,
            %status,
            %url,
            %snippet,
            latency_ms = started.elapsed().as_millis(),
            "provider returned non-success status"
        );
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet,
            }),
        )
        .into());
    }

    let out = resp.json::<R>().await.map_err(|e| {
        if e.is_timeout() {
            return transport_error(e, started);
        }
        ProviderError::new(
            provider,
            ProviderErrorKind::Decode(format!("{e}; expected {expect}")),
        )
        .into()
    })?;
    debug!(?provider, %url, latency_ms = started.elapsed().as_millis(), "POST ok");
    Ok(out)
}

/// Client timeouts become [`AiLlmError::Timeout`]; anything else stays a
/// transport error.
fn transport_error(e: reqwest::Error, started: Instant) -> AiLlmError {
    if e.is_timeout() {
        AiLlmError::Timeout(started.elapsed())
    } else {
        AiLlmError::HttpTransport(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_strips_trailing_slash() {
        assert_eq!(
            base_url(LlmProvider::OpenAI, " https://openrouter.ai/api/ ").unwrap(),
            "https://openrouter.ai/api"
        );
    }

    #[tokio::test]
    async fn client_timeout_maps_to_timeout_error() {
        // Accepts the connection but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = with_timeout(reqwest::Client::builder(), None)
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let err = post_json::<_, serde_json::Value>(
            &client,
            LlmProvider::Ollama,
            &format!("http://{addr}/api/chat"),
            &serde_json::json!({}),
            "anything",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AiLlmError::Timeout(_)), "got {err:?}");
        server.abort();
    }

    #[test]
    fn base_url_requires_http_scheme() {
        let err = base_url(LlmProvider::Ollama, "localhost:11434").unwrap_err();
        assert!(err.to_string().contains("invalid endpoint"));
    }
}
