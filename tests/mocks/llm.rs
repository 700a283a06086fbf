use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use url_summarizer::{CompletionError, Credentials, InitError, LlmClient, LlmClientFactory};

#[derive(Clone)]
pub struct MockLlmClient {
    pub reply: Result<String, CompletionError>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLlmClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: CompletionError) -> Self {
        Self {
            reply: Err(error),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn model(&self) -> &str {
        "mock-llama"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}

/// Hands out the same [`MockLlmClient`] and records every construction.
#[derive(Clone)]
pub struct MockClientFactory {
    pub client: MockLlmClient,
    pub created: Arc<Mutex<Vec<(String, String)>>>,
    pub fail_with: Option<InitError>,
}

impl MockClientFactory {
    pub fn new(client: MockLlmClient) -> Self {
        Self {
            client,
            created: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(error: InitError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new(MockLlmClient::new(""))
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.client.prompts.lock().unwrap().clone()
    }

    pub fn creation_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

impl LlmClientFactory for MockClientFactory {
    fn create(
        &self,
        credentials: &Credentials,
        model: &str,
    ) -> Result<Arc<dyn LlmClient>, InitError> {
        self.created
            .lock()
            .unwrap()
            .push((credentials.expose().to_string(), model.to_string()));
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        Ok(Arc::new(self.client.clone()))
    }
}
