/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// `OpenAI` covers every OpenAI-compatible REST API, OpenRouter included; the
/// concrete host comes from [`crate::LlmModelConfig::endpoint`].
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmProvider;
///
/// let provider: LlmProvider = "openrouter".parse().unwrap();
/// assert_eq!(provider, LlmProvider::OpenAI);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime for on-device inference.
    Ollama,
    /// OpenAI-compatible chat completions API (OpenAI, OpenRouter, vLLM, ...).
    OpenAI,
}

impl std::str::FromStr for LlmProvider {
    type Err = crate::error_handler::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" | "openrouter" | "chatgpt" => Ok(Self::OpenAI),
            other => Err(crate::error_handler::ConfigError::UnsupportedProvider(
                other.to_string(),
            )),
        }
    }
}
