use crate::fetcher::DEFAULT_MAX_CONTENT_SIZE;
use crate::llm_config::LlmConfig;
use crate::summarizer::{PromptTemplate, DEFAULT_CONTEXT_WINDOW_TOKENS};
use crate::youtube::YoutubeLoaderConfig;
use std::time::Duration;

/// Everything the orchestrator needs besides the per-request inputs.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub llm: LlmConfig,
    pub prompt: PromptTemplate,
    pub context_window_tokens: usize,
    /// Timeout for page and transcript downloads.
    pub fetch_timeout: Duration,
    /// Largest page or transcript body accepted, in bytes.
    pub max_content_size: usize,
    pub youtube: YoutubeLoaderConfig,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            prompt: PromptTemplate::default(),
            context_window_tokens: DEFAULT_CONTEXT_WINDOW_TOKENS,
            fetch_timeout: Duration::from_secs(30),
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
            youtube: YoutubeLoaderConfig::default(),
        }
    }
}

impl SummarizerConfig {
    /// Defaults with optional overrides from `GROQ_MODEL`, `GROQ_API_BASE`
    /// and `SUMMARIZER_TIMEOUT_SECS`. None of them is required.
    pub fn from_env() -> Self {
        let mut config = Self {
            llm: LlmConfig::from_env(),
            ..Self::default()
        };

        if let Some(secs) = std::env::var("SUMMARIZER_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
        {
            config.fetch_timeout = Duration::from_secs(secs);
            config.llm.timeout = Duration::from_secs(secs.max(1) * 2);
        }

        config
    }

    pub fn model(&self) -> &str {
        &self.llm.model
    }

    pub fn with_llm(mut self, llm: LlmConfig) -> Self {
        self.llm = llm;
        self
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_context_window_tokens(mut self, tokens: usize) -> Self {
        self.context_window_tokens = tokens;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_content_size(mut self, bytes: usize) -> Self {
        self.max_content_size = bytes;
        self
    }

    pub fn with_youtube(mut self, youtube: YoutubeLoaderConfig) -> Self {
        self.youtube = youtube;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SummarizerConfig::default();
        assert_eq!(config.model(), "llama-3.3-70b-versatile");
        assert_eq!(config.context_window_tokens, 131_072);
        assert_eq!(config.youtube.languages, vec!["en".to_string()]);
    }

    #[test]
    fn test_builder_setters() {
        let config = SummarizerConfig::default()
            .with_context_window_tokens(8_192)
            .with_fetch_timeout(Duration::from_secs(5))
            .with_llm(LlmConfig::default().with_model("llama-3.1-8b-instant"));
        assert_eq!(config.context_window_tokens, 8_192);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.model(), "llama-3.1-8b-instant");
    }
}
