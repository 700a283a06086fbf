//! LLM configuration and validation utilities

use crate::InitError;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// API key validation utilities
///
/// Only the shape of the key is checked here; whether the backend accepts
/// it is known after the first completion call.
pub struct ApiKeyValidator;

impl ApiKeyValidator {
    /// Validate Groq API key format
    pub fn validate_groq_key(api_key: &str) -> Result<(), InitError> {
        if api_key.trim().is_empty() {
            return Err(InitError::InvalidKey(
                "Groq API key cannot be empty".to_string(),
            ));
        }

        if api_key
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || !c.is_ascii())
        {
            return Err(InitError::InvalidKey(
                "Groq API key contains whitespace or non-printable characters".to_string(),
            ));
        }

        if !api_key.starts_with("gsk_") {
            debug!("Groq API key does not use the usual 'gsk_' prefix");
        }

        Ok(())
    }

    pub fn validate_model_name(model: &str) -> Result<(), InitError> {
        if model.trim().is_empty() {
            return Err(InitError::InvalidModel(
                "Model name cannot be empty".to_string(),
            ));
        }
        if model != DEFAULT_MODEL {
            debug!(model = %model, "Using a model other than the default");
        }
        Ok(())
    }
}

/// Connection settings for the LLM backend.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GROQ_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }
}

impl LlmConfig {
    /// Defaults overridden by `GROQ_MODEL` and `GROQ_API_BASE` when set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: std::env::var("GROQ_API_BASE").unwrap_or(defaults.api_base),
            model: std::env::var("GROQ_MODEL").unwrap_or(defaults.model),
            ..defaults
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_key_validation() {
        assert!(ApiKeyValidator::validate_groq_key("gsk_1234567890abcdefghij").is_ok());
        // unusual prefixes are left for the backend to judge
        assert!(ApiKeyValidator::validate_groq_key("custom-key").is_ok());

        assert!(ApiKeyValidator::validate_groq_key("").is_err());
        assert!(ApiKeyValidator::validate_groq_key("   ").is_err());
        assert!(ApiKeyValidator::validate_groq_key("gsk_abc def").is_err());
        assert!(ApiKeyValidator::validate_groq_key("gsk_abc\n").is_err());
        assert!(ApiKeyValidator::validate_groq_key("gsk_ключ").is_err());
    }

    #[test]
    fn test_model_validation() {
        assert!(ApiKeyValidator::validate_model_name(DEFAULT_MODEL).is_ok());
        assert!(ApiKeyValidator::validate_model_name("mixtral-8x7b-32768").is_ok());
        assert!(matches!(
            ApiKeyValidator::validate_model_name(""),
            Err(InitError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(
            config.chat_completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(
            config.with_api_base("http://localhost:1234/v1/").chat_completions_url(),
            "http://localhost:1234/v1/chat/completions"
        );
    }
}
