use std::sync::Arc;

use procurechat_agent::assistant::{AssistantOptions, ProcurementAssistant};
use procurechat_agent::llm::{LlmClient, OpenAiClient};
use procurechat_core::config::{AppConfig, ConfigError, LoadOptions};
use procurechat_core::prompts::{PromptCatalog, PromptError};
use procurechat_store::client::{DataApiClient, DocumentStore, StoreError};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub store: Arc<dyn DocumentStore>,
    pub assistant: Arc<ProcurementAssistant>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("document store client setup failed: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Prompts(#[from] PromptError),
    #[error("llm client setup failed: {0}")]
    Llm(#[source] anyhow::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Wire the long-lived collaborators once: one store client, one
/// deterministic LLM client for classification and query translation,
/// one chat-temperature client for prose, and the prompt catalog.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let store: Arc<dyn DocumentStore> = Arc::new(DataApiClient::from_config(&config.store)?);
    info!(
        event_name = "system.bootstrap.store_client_ready",
        correlation_id = "bootstrap",
        "document store client constructed"
    );

    let llm_precise: Arc<dyn LlmClient> =
        Arc::new(OpenAiClient::from_config(&config.llm, 0.0).map_err(BootstrapError::Llm)?);
    let llm_chat: Arc<dyn LlmClient> = Arc::new(
        OpenAiClient::from_config(&config.llm, config.llm.chat_temperature)
            .map_err(BootstrapError::Llm)?,
    );

    let prompts = Arc::new(PromptCatalog::new()?);
    let assistant = Arc::new(ProcurementAssistant::new(
        llm_precise,
        llm_chat,
        store.clone(),
        prompts,
        AssistantOptions::from(&config.assistant),
    ));

    info!(
        event_name = "system.bootstrap.completed",
        correlation_id = "bootstrap",
        "assistant runtime wired"
    );

    Ok(Application { config, store, assistant })
}
