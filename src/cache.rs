#![cfg(feature = "cache")]

use crate::{Credentials, InitError, LlmClient, LlmClientFactory};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Reuses LLM clients across requests, keyed by (credentials, model).
#[derive(Clone)]
pub struct ClientCache {
    clients: Arc<DashMap<(Credentials, String), Arc<dyn LlmClient>>>,
}

impl Default for ClientCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientCache {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(DashMap::new()),
        }
    }

    /// Returns the cached client or builds one with `factory`. Failed
    /// constructions are not cached.
    pub fn get_or_create(
        &self,
        factory: &dyn LlmClientFactory,
        credentials: &Credentials,
        model: &str,
    ) -> Result<Arc<dyn LlmClient>, InitError> {
        let key = (credentials.clone(), model.to_string());
        if let Some(client) = self.clients.get(&key) {
            debug!(model = %model, "Reusing cached LLM client");
            return Ok(Arc::clone(client.value()));
        }

        let client = factory.create(credentials, model)?;
        self.clients.insert(key, Arc::clone(&client));
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn clear(&self) {
        self.clients.clear();
    }
}
