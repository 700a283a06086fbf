#[cfg(feature = "cache")]
use crate::cache::ClientCache;
use crate::fetcher::{Fetcher, FetcherConfig};
use crate::llm_client::GroqClientFactory;
use crate::loader::{ensure_content, SourceLoader, WebsiteLoader};
use crate::summarizer::Summarizer;
use crate::youtube::YoutubeLoader;
use crate::{
    classify, ContentLoader, Credentials, InitError, LlmClient, LlmClientFactory,
    SummarizerConfig, SummaryError,
};
use futures::future::{select, Either};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

/// The two strings the form hands over on each trigger.
#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    pub api_key: String,
    pub url: String,
}

impl SummaryRequest {
    pub fn new(api_key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            url: url.into(),
        }
    }
}

/// What the form displays once a request finishes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum Outcome {
    Success { summary: String },
    Error { message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Stages of one request, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Validating,
    Loading,
    Summarizing,
    Done { success: bool },
}

/// Sequences validation, loading and summarization for one request at a
/// time and reports every failure as a message.
///
/// Runs are independent: concurrent calls are neither queued nor
/// deduplicated. No stage is retried.
pub struct Orchestrator {
    config: SummarizerConfig,
    loader: Arc<dyn ContentLoader>,
    factory: Arc<dyn LlmClientFactory>,
    summarizer: Summarizer,
    #[cfg(feature = "cache")]
    cache: Option<ClientCache>,
    last_trace: Mutex<Vec<RequestState>>,
}

impl Orchestrator {
    /// Orchestrator backed by the real YouTube, website and Groq services.
    ///
    /// Fails with [`InitError::Client`] when an HTTP client cannot be built.
    pub fn new(config: SummarizerConfig) -> Result<Self, InitError> {
        let website = WebsiteLoader::with_fetcher(Fetcher::new_with_config(
            FetcherConfig::website()
                .with_timeout(config.fetch_timeout)
                .with_max_content_size(config.max_content_size),
        )?);
        let video = YoutubeLoader::with_fetcher(
            Fetcher::new_with_config(
                FetcherConfig::video_platform()
                    .with_timeout(config.fetch_timeout)
                    .with_max_content_size(config.max_content_size),
            )?,
            config.youtube.clone(),
        );
        let loader = SourceLoader::new(Arc::new(video), Arc::new(website));
        let factory = GroqClientFactory::new(config.llm.clone());

        Ok(Self::with_components(
            config,
            Arc::new(loader),
            Arc::new(factory),
        ))
    }

    pub fn with_components(
        config: SummarizerConfig,
        loader: Arc<dyn ContentLoader>,
        factory: Arc<dyn LlmClientFactory>,
    ) -> Self {
        let summarizer = Summarizer::new(config.prompt.clone(), config.context_window_tokens);
        Self {
            config,
            loader,
            factory,
            summarizer,
            #[cfg(feature = "cache")]
            cache: None,
            last_trace: Mutex::new(vec![RequestState::Idle]),
        }
    }

    /// Reuse LLM clients across requests with the same key and model.
    #[cfg(feature = "cache")]
    pub fn with_client_cache(mut self, cache: ClientCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// States entered by the most recently finished run.
    pub fn last_trace(&self) -> Vec<RequestState> {
        self.last_trace
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last_state(&self) -> RequestState {
        self.last_trace()
            .last()
            .copied()
            .unwrap_or(RequestState::Idle)
    }

    /// Handles one trigger. Never fails: errors become [`Outcome::Error`].
    pub async fn run(&self, request: &SummaryRequest) -> Outcome {
        match self.try_run(request).await {
            Ok(summary) => {
                info!(summary_len = summary.len(), "Summary generated");
                Outcome::Success { summary }
            }
            Err(e) => {
                e.log();
                Outcome::Error {
                    message: e.user_message(),
                }
            }
        }
    }

    /// Like [`run`](Self::run), but gives up as soon as `cancel` completes.
    /// A cancelled run yields `None` and leaves no trace behind.
    pub async fn run_until_cancelled<C>(
        &self,
        request: &SummaryRequest,
        cancel: C,
    ) -> Option<Outcome>
    where
        C: Future<Output = ()>,
    {
        let run = std::pin::pin!(self.run(request));
        let cancel = std::pin::pin!(cancel);

        match select(run, cancel).await {
            Either::Left((outcome, _)) => Some(outcome),
            Either::Right(((), _)) => {
                info!(url = %request.url, "Summary request cancelled");
                None
            }
        }
    }

    /// Runs the pipeline and returns the typed error instead of a message.
    #[instrument(level = "debug", skip_all, fields(url = %request.url))]
    pub async fn try_run(&self, request: &SummaryRequest) -> Result<String, SummaryError> {
        let mut trace = Trace::default();
        let result = self.execute(request, &mut trace).await;
        trace.enter(RequestState::Done {
            success: result.is_ok(),
        });

        *self
            .last_trace
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = trace.states;
        result
    }

    async fn execute(
        &self,
        request: &SummaryRequest,
        trace: &mut Trace,
    ) -> Result<String, SummaryError> {
        trace.enter(RequestState::Validating);
        let api_key = request.api_key.trim();
        let url = request.url.trim();
        if api_key.is_empty() || url.is_empty() {
            return Err(SummaryError::MissingInput);
        }
        let kind = classify(url)?;

        trace.enter(RequestState::Loading);
        let docs = self.loader.load(url, kind).await?;
        let docs = ensure_content(docs, url)?;
        debug!(documents = docs.len(), "Content loaded");

        trace.enter(RequestState::Summarizing);
        let client = self.client_for(&Credentials::new(api_key))?;
        let summary = self.summarizer.summarize(&docs, client.as_ref()).await?;
        Ok(summary)
    }

    fn client_for(&self, credentials: &Credentials) -> Result<Arc<dyn LlmClient>, InitError> {
        let model = self.config.model();

        #[cfg(feature = "cache")]
        if let Some(cache) = &self.cache {
            return cache.get_or_create(self.factory.as_ref(), credentials, model);
        }

        self.factory.create(credentials, model)
    }
}

struct Trace {
    states: Vec<RequestState>,
}

impl Default for Trace {
    fn default() -> Self {
        Self {
            states: vec![RequestState::Idle],
        }
    }
}

impl Trace {
    fn enter(&mut self, state: RequestState) {
        debug!(?state, "Request state changed");
        self.states.push(state);
    }
}
