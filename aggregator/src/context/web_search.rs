//! Web search seam and its Tavily implementation.

use std::time::Duration;

use ai_llm_service::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::CONTEXT_SEPARATOR;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Debug, Error)]
pub enum WebSearchError {
    #[error("web search is not configured (TAVILY_API_KEY unset)")]
    NotConfigured,

    #[error("web search transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("web search returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub struct WebHit {
    pub url: String,
    pub content: String,
}

pub trait WebSearch: Send + Sync {
    fn search<'a>(
        &'a self,
        query: &'a str,
        max_results: u32,
    ) -> BoxFuture<'a, Result<Vec<WebHit>, WebSearchError>>;
}

/// Web context for `question`: up to `top_k` hits formatted as
/// `Source: <url>\nContent: <content>` and joined with the context separator.
///
/// Never fails. Any search error is logged and yields an empty string.
#[instrument(skip_all, fields(top_k = top_k))]
pub async fn get_web_context(search: &dyn WebSearch, question: &str, top_k: u32) -> String {
    match search.search(question, top_k).await {
        Ok(hits) => {
            debug!(hits = hits.len(), "web context fetched");
            format_hits(&hits)
        }
        Err(e) => {
            warn!(error = %e, "web search failed, continuing without web context");
            String::new()
        }
    }
}

fn format_hits(hits: &[WebHit]) -> String {
    hits.iter()
        .map(|h| format!("Source: {}\nContent: {}", h.url, h.content))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Tavily search API client.
pub struct TavilySearch {
    api_key: String,
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>) -> Result<Self, WebSearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            api_key: api_key.into(),
            client,
            url: TAVILY_SEARCH_URL.to_string(),
        })
    }
}

impl WebSearch for TavilySearch {
    fn search<'a>(
        &'a self,
        query: &'a str,
        max_results: u32,
    ) -> BoxFuture<'a, Result<Vec<WebHit>, WebSearchError>> {
        Box::pin(async move {
            let request = TavilySearchRequest {
                api_key: &self.api_key,
                query,
                max_results,
            };
            let resp = self.client.post(&self.url).json(&request).send().await?;
            if !resp.status().is_success() {
                let status = resp.status();
                let body: String = resp
                    .text()
                    .await
                    .unwrap_or_default()
                    .chars()
                    .take(240)
                    .collect();
                return Err(WebSearchError::Status { status, body });
            }
            let parsed: TavilySearchResponse = resp.json().await?;
            Ok(parsed
                .results
                .into_iter()
                .take(max_results as usize)
                .map(|r| WebHit {
                    url: r.url,
                    content: r.content,
                })
                .collect())
        })
    }
}

/// Stand-in used when no search API key is configured.
pub struct DisabledWebSearch;

impl WebSearch for DisabledWebSearch {
    fn search<'a>(
        &'a self,
        _query: &'a str,
        _max_results: u32,
    ) -> BoxFuture<'a, Result<Vec<WebHit>, WebSearchError>> {
        Box::pin(async { Err(WebSearchError::NotConfigured) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixed(Vec<WebHit>);

    impl WebSearch for Fixed {
        fn search<'a>(
            &'a self,
            _query: &'a str,
            max_results: u32,
        ) -> BoxFuture<'a, Result<Vec<WebHit>, WebSearchError>> {
            let hits = self.0.iter().take(max_results as usize).cloned().collect();
            Box::pin(async move { Ok(hits) })
        }
    }

    #[tokio::test]
    async fn hits_are_formatted_and_joined() {
        let search = Fixed(vec![
            WebHit {
                url: "https://a.example".into(),
                content: "alpha".into(),
            },
            WebHit {
                url: "https://b.example".into(),
                content: "beta".into(),
            },
        ]);
        let ctx = get_web_context(&search, "q", 3).await;
        assert_eq!(
            ctx,
            "Source: https://a.example\nContent: alpha\n---\nSource: https://b.example\nContent: beta"
        );
    }

    #[tokio::test]
    async fn failures_become_empty_context() {
        assert_eq!(get_web_context(&DisabledWebSearch, "q", 3).await, "");
    }

    #[test]
    fn tavily_request_body_shape() {
        let body = serde_json::to_value(TavilySearchRequest {
            api_key: "k",
            query: "rust",
            max_results: 3,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"api_key": "k", "query": "rust", "max_results": 3})
        );
    }
}
