use std::sync::Arc;

use procurechat_core::domain::Verdict;
use procurechat_core::prompts::{PromptCatalog, PromptError};
use thiserror::Error;

use crate::llm::LlmClient;

/// How a classification attempt can fail. Every variant maps to the
/// same outcome (the fallback verdict); the type exists so the
/// degrade-to-default policy is an explicit decision at the call site
/// rather than a catch-all.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("classification call failed: {0}")]
    Model(#[source] anyhow::Error),
    #[error("classifier returned unparseable output `{raw}`: {source}")]
    Parse { raw: String, source: serde_json::Error },
}

/// Decides how an incoming message should be routed.
pub struct MessageClassifier {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptCatalog>,
}

impl MessageClassifier {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptCatalog>) -> Self {
        Self { llm, prompts }
    }

    /// Classify a message, degrading to [`Verdict::fallback`] on any
    /// failure. An unclassifiable message is treated as conversation,
    /// never as a reason to fail the request. No retries.
    pub async fn classify(&self, message: &str) -> Verdict {
        match self.try_classify(message).await {
            Ok(verdict) => verdict,
            Err(error) => {
                tracing::warn!(
                    event_name = "classifier.fallback",
                    error = %error,
                    "classification failed, falling back to chat verdict"
                );
                Verdict::fallback()
            }
        }
    }

    async fn try_classify(&self, message: &str) -> Result<Verdict, ClassifyError> {
        let prompt = self.prompts.classify(message)?;
        let raw = self.llm.complete(&prompt).await.map_err(ClassifyError::Model)?;

        serde_json::from_str(raw.trim())
            .map_err(|source| ClassifyError::Parse { raw: raw.trim().to_string(), source })
    }
}
