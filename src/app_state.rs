use std::sync::Arc;

use crate::client::{AzureOpenAiClient, CompletionClient};
use crate::config::GatewayConfig;

/// Shared per-worker state: the pre-configured model client plus the per-row
/// retry budget handed to each integrator.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn CompletionClient>,
    pub max_retry: usize,
}

impl AppState {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let client = AzureOpenAiClient::new(config)?;
        Ok(AppState {
            client: Arc::new(client),
            max_retry: config.max_retry,
        })
    }

    /// State backed by an arbitrary client, used by handler tests.
    pub fn with_client(client: Arc<dyn CompletionClient>, max_retry: usize) -> Self {
        AppState { client, max_retry }
    }
}
