use crate::extractor::TextExtractor;
use crate::fetcher::Fetcher;
use crate::{ContentLoader, Document, InitError, LoadError, SourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Rejects document sets that leave nothing to summarize.
pub fn ensure_content(docs: Vec<Document>, url: &str) -> Result<Vec<Document>, LoadError> {
    if docs.is_empty() {
        return Err(LoadError::Empty(format!("{url} produced no documents")));
    }
    if docs.iter().all(Document::is_blank) {
        return Err(LoadError::Empty(format!("{url} contains no readable text")));
    }
    Ok(docs)
}

/// Loads an arbitrary web page and strips it down to text.
#[derive(Clone)]
pub struct WebsiteLoader {
    fetcher: Fetcher,
    extractor: TextExtractor,
}

impl WebsiteLoader {
    pub fn new() -> Result<Self, InitError> {
        Ok(Self::with_fetcher(Fetcher::new_website_client()?))
    }

    pub fn with_fetcher(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            extractor: TextExtractor::new(),
        }
    }
}

#[async_trait]
impl ContentLoader for WebsiteLoader {
    #[instrument(level = "debug", skip(self), err)]
    async fn load(&self, url: &str, _kind: SourceKind) -> Result<Vec<Document>, LoadError> {
        let page = self.fetcher.fetch(url).await?;

        let doc = if page.is_html() {
            self.extractor.extract(&page.body, url)?
        } else if page.is_text() {
            self.extractor.extract_plain(&page.body, url)
        } else {
            return Err(LoadError::Unsupported(format!(
                "{url} returned {}",
                page.content_type.as_deref().unwrap_or("unknown content")
            )));
        };

        ensure_content(vec![doc], url)
    }
}

/// Picks the loader strategy for a [`SourceKind`].
#[derive(Clone)]
pub struct SourceLoader {
    video: Arc<dyn ContentLoader>,
    website: Arc<dyn ContentLoader>,
}

impl SourceLoader {
    pub fn new(video: Arc<dyn ContentLoader>, website: Arc<dyn ContentLoader>) -> Self {
        Self { video, website }
    }
}

#[async_trait]
impl ContentLoader for SourceLoader {
    async fn load(&self, url: &str, kind: SourceKind) -> Result<Vec<Document>, LoadError> {
        debug!(url = %url, ?kind, "Dispatching to loader");
        match kind {
            SourceKind::VideoPlatform => self.video.load(url, kind).await,
            SourceKind::GenericWebsite => self.website.load(url, kind).await,
        }
    }
}
