//! "Stuff" summarization: every document body goes into one prompt and one
//! completion call. Nothing is chunked, so the total content is bounded by the
//! model context window; larger inputs fail with
//! [`SummarizeError::TooLong`].

use crate::utils::estimate_tokens;
use crate::{CompletionError, Document, LlmClient, SummarizeError};
use tracing::{debug, instrument, warn};

pub const SUMMARY_PROMPT: &str =
    "Provide a summary of the following content in 300 words:\nContent: {text}";

/// Placed between document bodies when they are stuffed into the prompt.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

const TEXT_SLOT: &str = "{text}";

/// Context window of the default model, in tokens.
pub const DEFAULT_CONTEXT_WINDOW_TOKENS: usize = 131_072;

/// A prompt with a single `{text}` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: SUMMARY_PROMPT.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Accepts templates containing the `{text}` slot exactly once.
    pub fn new(template: impl Into<String>) -> Result<Self, SummarizeError> {
        let template = template.into();
        match template.matches(TEXT_SLOT).count() {
            1 => Ok(Self { template }),
            n => Err(SummarizeError::Other(format!(
                "Prompt template must contain {TEXT_SLOT} exactly once, found {n}"
            ))),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn render(&self, text: &str) -> String {
        self.template.replacen(TEXT_SLOT, text, 1)
    }
}

#[derive(Debug, Clone)]
pub struct Summarizer {
    template: PromptTemplate,
    context_window_tokens: usize,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(PromptTemplate::default(), DEFAULT_CONTEXT_WINDOW_TOKENS)
    }
}

impl Summarizer {
    pub fn new(template: PromptTemplate, context_window_tokens: usize) -> Self {
        Self {
            template,
            context_window_tokens,
        }
    }

    /// The exact prompt [`summarize`](Self::summarize) submits for `docs`.
    pub fn build_prompt(&self, docs: &[Document]) -> String {
        let text = docs
            .iter()
            .map(|doc| doc.page_content.as_str())
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR);
        self.template.render(&text)
    }

    /// Returns the model's response verbatim; the 300-word target is only
    /// an instruction to the model.
    #[instrument(level = "debug", skip_all, fields(documents = docs.len(), model = client.model()))]
    pub async fn summarize(
        &self,
        docs: &[Document],
        client: &dyn LlmClient,
    ) -> Result<String, SummarizeError> {
        if docs.is_empty() {
            return Err(SummarizeError::Other("No documents to summarize".to_string()));
        }

        let prompt = self.build_prompt(docs);
        let estimated = estimate_tokens(&prompt);
        if estimated > self.context_window_tokens {
            warn!(
                estimated_tokens = estimated,
                limit = self.context_window_tokens,
                "Prompt exceeds context window"
            );
            return Err(SummarizeError::TooLong(format!(
                "about {estimated} tokens, limit is {}",
                self.context_window_tokens
            )));
        }

        debug!(prompt_len = prompt.len(), estimated_tokens = estimated, "Submitting prompt");
        client.complete(&prompt).await.map_err(|e| match e {
            CompletionError::ContextLength(detail) => SummarizeError::TooLong(detail),
            other => SummarizeError::Completion(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoClient {
        prompts: Mutex<Vec<String>>,
        reply: Result<String, CompletionError>,
    }

    impl EchoClient {
        fn replying(reply: Result<String, CompletionError>) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                reply,
            }
        }
    }

    #[async_trait]
    impl LlmClient for EchoClient {
        fn model(&self) -> &str {
            "echo"
        }

        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    #[test]
    fn test_template_requires_single_slot() {
        assert!(PromptTemplate::new("Summarize: {text}").is_ok());
        assert!(PromptTemplate::new("Summarize").is_err());
        assert!(PromptTemplate::new("{text} and {text}").is_err());
    }

    #[test]
    fn test_render_does_not_expand_slot_in_content() {
        let template = PromptTemplate::default();
        let rendered = template.render("literal {text} inside");
        assert_eq!(
            rendered,
            "Provide a summary of the following content in 300 words:\nContent: literal {text} inside"
        );
    }

    #[tokio::test]
    async fn test_single_call_with_stuffed_prompt() {
        let client = EchoClient::replying(Ok("summary".to_string()));
        let docs = vec![Document::new("first"), Document::new("second")];

        let summary = Summarizer::default().summarize(&docs, &client).await.unwrap();

        assert_eq!(summary, "summary");
        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(
            prompts[0],
            "Provide a summary of the following content in 300 words:\nContent: first\n\nsecond"
        );
    }

    #[tokio::test]
    async fn test_oversized_prompt_is_rejected_locally() {
        let client = EchoClient::replying(Ok("unused".to_string()));
        let summarizer = Summarizer::new(PromptTemplate::default(), 10);

        let result = summarizer
            .summarize(&[Document::new("x".repeat(1_000))], &client)
            .await;

        assert!(matches!(result, Err(SummarizeError::TooLong(_))));
        assert!(client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_context_error_maps_to_too_long() {
        let client = EchoClient::replying(Err(CompletionError::ContextLength("413".into())));
        let result = Summarizer::default()
            .summarize(&[Document::new("text")], &client)
            .await;
        assert_eq!(result, Err(SummarizeError::TooLong("413".into())));

        let client = EchoClient::replying(Err(CompletionError::RateLimit("slow down".into())));
        let result = Summarizer::default()
            .summarize(&[Document::new("text")], &client)
            .await;
        assert_eq!(
            result,
            Err(SummarizeError::Completion(CompletionError::RateLimit(
                "slow down".into()
            )))
        );
    }

    #[tokio::test]
    async fn test_no_documents() {
        let client = EchoClient::replying(Ok("unused".to_string()));
        let result = Summarizer::default().summarize(&[], &client).await;
        assert!(matches!(result, Err(SummarizeError::Other(_))));
    }
}
