use thiserror::Error;
use tracing::{error, warn};

/// Every failure a summary request can end in.
///
/// The orchestrator converts each variant into exactly one user-facing
/// message, so this set is closed: nested failures are wrapped, never
/// passed through raw.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("API key and URL are both required")]
    MissingInput,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Summarize(SummarizeError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Failed to fetch content: {0}")]
    Network(String),

    #[error("Unsupported content: {0}")]
    Unsupported(String),

    #[error("No content found: {0}")]
    Empty(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("Invalid API key: {0}")]
    InvalidKey(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("LLM backend rejected the credentials: {0}")]
    Auth(String),

    #[error("LLM backend rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("LLM backend unreachable: {0}")]
    Network(String),

    #[error("LLM backend error: {0}")]
    ModelError(String),

    #[error("Prompt exceeds the model context window: {0}")]
    ContextLength(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("Content is too long to summarize in one request: {0}")]
    TooLong(String),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("Summarization failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for LoadError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() || error.is_body() {
            LoadError::Unsupported(error.to_string())
        } else {
            LoadError::Network(error.to_string())
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            CompletionError::ModelError(format!("Malformed response: {error}"))
        } else {
            CompletionError::Network(error.to_string())
        }
    }
}

impl SummaryError {
    /// Message shown to the operator when a request ends in this error.
    pub fn user_message(&self) -> String {
        match self {
            SummaryError::MissingInput => {
                "Please provide both the Groq API Key and a URL.".to_string()
            }
            SummaryError::InvalidUrl(_) => {
                "Please enter a valid URL. It can either be a YouTube video URL or a website URL."
                    .to_string()
            }
            SummaryError::Load(LoadError::Empty(_)) => {
                format!("No readable content was found at that URL. ({self})")
            }
            SummaryError::Load(e) => format!("Could not load the content: {e}"),
            SummaryError::Init(e) => {
                format!("Groq API Key is not valid or failed to initialize the model. ({e})")
            }
            SummaryError::Completion(CompletionError::Auth(_)) => {
                format!("Groq API Key was rejected. ({self})")
            }
            SummaryError::Completion(CompletionError::RateLimit(_)) => {
                format!("The LLM service is rate limiting requests, try again later. ({self})")
            }
            SummaryError::Summarize(SummarizeError::TooLong(_)) => {
                format!("The content is too long to summarize. ({self})")
            }
            other => format!("An error occurred: {other}"),
        }
    }

    pub fn log(&self) {
        match self {
            SummaryError::MissingInput => {
                warn!("Summary requested without API key or URL");
            }
            SummaryError::InvalidUrl(e) => {
                warn!(error = %e, "URL validation failed");
            }
            SummaryError::Load(LoadError::Network(e)) => {
                error!(error = %e, "Content fetch failed");
            }
            SummaryError::Load(e) => {
                warn!(error = %e, "Content extraction failed");
            }
            SummaryError::Init(e) => {
                warn!(error = %e, "LLM client initialization failed");
            }
            SummaryError::Completion(CompletionError::RateLimit(e)) => {
                warn!(error = %e, "LLM rate limit exceeded");
            }
            SummaryError::Completion(e) => {
                error!(
                    service = "groq",
                    error = %e,
                    "LLM completion failed"
                );
            }
            SummaryError::Summarize(e) => {
                error!(error = %e, "Summarization failed");
            }
        }
    }
}

impl From<SummarizeError> for SummaryError {
    fn from(error: SummarizeError) -> Self {
        match error {
            SummarizeError::Completion(e) => SummaryError::Completion(e),
            other => SummaryError::Summarize(other),
        }
    }
}
