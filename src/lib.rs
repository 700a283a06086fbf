//! Summarize YouTube videos and web pages with an LLM.
//!
//! A request flows through [`classify`] → [`ContentLoader`] → [`Summarizer`]
//! → [`LlmClient`], sequenced by the [`Orchestrator`], which turns every
//! failure into one user-facing message.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "cache")]
mod cache;
mod classifier;
mod config;
mod error;
mod extractor;
mod fetcher;
mod llm_client;
mod llm_config;
mod loader;
#[cfg(feature = "logging")]
mod logging;
mod orchestrator;
mod summarizer;
mod utils;
mod youtube;

#[cfg(feature = "cache")]
pub use cache::ClientCache;
pub use classifier::{classify, validate, VIDEO_PLATFORM_MARKER};
pub use config::SummarizerConfig;
pub use error::{CompletionError, InitError, LoadError, SummarizeError, SummaryError};
pub use extractor::TextExtractor;
pub use fetcher::{
    FetchedPage, Fetcher, FetcherConfig, BROWSER_USER_AGENT, DEFAULT_MAX_CONTENT_SIZE,
};
pub use llm_client::{GroqClient, GroqClientFactory, LlmClient, LlmClientFactory};
pub use llm_config::{ApiKeyValidator, LlmConfig, DEFAULT_GROQ_API_BASE, DEFAULT_MODEL};
pub use loader::{ensure_content, SourceLoader, WebsiteLoader};
#[cfg(feature = "logging")]
pub use logging::{log_summary_card, setup_logging, LogConfig, LogLevelGuard};
pub use orchestrator::{Orchestrator, Outcome, RequestState, SummaryRequest};
pub use summarizer::{
    PromptTemplate, Summarizer, DEFAULT_CONTEXT_WINDOW_TOKENS, DOCUMENT_SEPARATOR, SUMMARY_PROMPT,
};
pub use utils::truncate_str;
pub use youtube::{extract_video_id, YoutubeLoader, YoutubeLoaderConfig};

/// Which loader strategy handles a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SourceKind {
    VideoPlatform,
    GenericWebsite,
}

/// A unit of retrieved text plus whatever metadata the loader found.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Document {
    pub page_content: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn is_blank(&self) -> bool {
        self.page_content.trim().is_empty()
    }
}

/// API key for the LLM backend. Never printed in full.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(***)")
    }
}

impl From<&str> for Credentials {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Credentials {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Retrieves the documents behind a URL.
#[async_trait]
pub trait ContentLoader: Send + Sync {
    async fn load(&self, url: &str, kind: SourceKind) -> Result<Vec<Document>, LoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_is_redacted() {
        let key = Credentials::new("gsk_secret_value");
        assert_eq!(format!("{key:?}"), "Credentials(***)");
        assert_eq!(key.expose(), "gsk_secret_value");
        assert!(Credentials::new("  ").is_blank());
    }

    #[test]
    fn test_document_metadata() {
        let doc = Document::new("body")
            .with_metadata("title", "A title")
            .with_metadata("source", "https://example.com");
        assert_eq!(doc.metadata_value("title"), Some("A title"));
        assert_eq!(doc.metadata_value("author"), None);
        assert!(!doc.is_blank());
        assert!(Document::new(" \n\t").is_blank());
    }
}
