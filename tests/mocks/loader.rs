use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use url_summarizer::{ContentLoader, Document, LoadError, SourceKind};

#[derive(Clone)]
pub struct MockLoader {
    pub docs: Vec<Document>,
    pub calls: Arc<Mutex<Vec<(String, SourceKind)>>>,
    pub fail_with: Option<LoadError>,
}

impl MockLoader {
    pub fn new(docs: Vec<Document>) -> Self {
        Self {
            docs,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn with_text(text: &str) -> Self {
        Self::new(vec![Document::new(text)])
    }

    pub fn failing(error: LoadError) -> Self {
        Self {
            docs: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(error),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentLoader for MockLoader {
    async fn load(&self, url: &str, kind: SourceKind) -> Result<Vec<Document>, LoadError> {
        self.calls.lock().unwrap().push((url.to_string(), kind));
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        Ok(self.docs.clone())
    }
}

/// Never finishes loading; used to exercise cancellation.
pub struct PendingLoader;

#[async_trait]
impl ContentLoader for PendingLoader {
    async fn load(&self, _url: &str, _kind: SourceKind) -> Result<Vec<Document>, LoadError> {
        std::future::pending().await
    }
}
