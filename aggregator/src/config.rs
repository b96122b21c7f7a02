//! Runtime configuration loaded from environment variables.

use ai_llm_service::LlmProfilesConfig;

use crate::error::AggregatorError;

pub const DEFAULT_WEB_TOP_K: u32 = 3;
pub const DEFAULT_JUDGE_PREFIX_CHARS: usize = 100;

/// Orchestration knobs. Model ids come from the LLM profiles; the rest from
/// `WEB_SEARCH_TOP_K`, `JUDGE_DUPLICATE_PREFIX_CHARS` and `TAVILY_API_KEY`.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatorConfig {
    pub primary_model: String,
    pub secondary_model: String,
    pub judge_model: String,
    /// Output token cap for every completion.
    pub max_tokens: Option<u32>,
    pub web_top_k: u32,
    /// Answers whose first N characters match skip the judge call; 0 disables.
    pub judge_prefix_chars: usize,
    pub tavily_api_key: Option<String>,
}

impl AggregatorConfig {
    pub fn from_env(profiles: &LlmProfilesConfig) -> Result<Self, AggregatorError> {
        Self::from_lookup(profiles, |k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(profiles: &LlmProfilesConfig, lookup: F) -> Result<Self, AggregatorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        let web_top_k = match get("WEB_SEARCH_TOP_K") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|e| AggregatorError::Config(format!("WEB_SEARCH_TOP_K: {e}")))?,
            None => DEFAULT_WEB_TOP_K,
        };
        let judge_prefix_chars = match get("JUDGE_DUPLICATE_PREFIX_CHARS") {
            Some(v) => v.trim().parse().map_err(|e| {
                AggregatorError::Config(format!("JUDGE_DUPLICATE_PREFIX_CHARS: {e}"))
            })?,
            None => DEFAULT_JUDGE_PREFIX_CHARS,
        };

        Ok(Self {
            primary_model: profiles.primary.model.clone(),
            secondary_model: profiles.secondary.model.clone(),
            judge_model: profiles.judge.model.clone(),
            max_tokens: profiles.primary.max_tokens,
            web_top_k,
            judge_prefix_chars,
            tavily_api_key: get("TAVILY_API_KEY"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> LlmProfilesConfig {
        LlmProfilesConfig::from_lookup(|k| (k == "OPENROUTER_API_KEY").then(|| "sk".into()))
            .unwrap()
    }

    #[test]
    fn defaults_follow_profiles() {
        let cfg = AggregatorConfig::from_lookup(&profiles(), |_| None).unwrap();
        assert_eq!(cfg.primary_model, "meta-llama/llama-3.3-70b-instruct:free");
        assert_eq!(cfg.judge_model, "mistralai/devstral-2512:free");
        assert_eq!(cfg.max_tokens, Some(10_000));
        assert_eq!(cfg.web_top_k, 3);
        assert_eq!(cfg.judge_prefix_chars, 100);
        assert_eq!(cfg.tavily_api_key, None);
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = AggregatorConfig::from_lookup(&profiles(), |k| match k {
            "JUDGE_DUPLICATE_PREFIX_CHARS" => Some("0".into()),
            "WEB_SEARCH_TOP_K" => Some("5".into()),
            "TAVILY_API_KEY" => Some("tvly-key".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.judge_prefix_chars, 0);
        assert_eq!(cfg.web_top_k, 5);
        assert_eq!(cfg.tavily_api_key.as_deref(), Some("tvly-key"));
    }

    #[test]
    fn garbage_number_is_rejected() {
        let err = AggregatorConfig::from_lookup(&profiles(), |k| {
            (k == "WEB_SEARCH_TOP_K").then(|| "many".into())
        })
        .unwrap_err();
        assert!(matches!(err, AggregatorError::Config(_)));
    }
}
