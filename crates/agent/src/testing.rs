//! Hand-rolled test doubles for the external collaborators. No network
//! in tests: scripted responses in, recorded calls out.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use procurechat_store::client::{DocumentStore, StoreError};
use serde_json::Value;

use crate::llm::LlmClient;

/// Replays a fixed queue of completion outcomes and records every
/// prompt it was asked to complete.
#[derive(Default)]
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn respond_with(responses: impl IntoIterator<Item = &'static str>) -> Self {
        let scripted = Self::default();
        for response in responses {
            scripted.push_ok(response);
        }
        scripted
    }

    pub fn push_ok(&self, response: &str) {
        self.responses.lock().expect("lock").push_back(Ok(response.to_string()));
    }

    pub fn push_err(&self, message: &str) {
        self.responses.lock().expect("lock").push_back(Err(message.to_string()));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("lock").clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        match self.responses.lock().expect("lock").pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("scripted llm ran out of responses")),
        }
    }
}

/// Returns a fixed row set for every aggregation and records the
/// pipelines it was asked to run.
#[derive(Default)]
pub struct ScriptedStore {
    rows: Vec<Value>,
    fail_with: Option<String>,
    aggregations: Mutex<Vec<(String, Vec<Value>)>>,
}

impl ScriptedStore {
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self { rows, ..Self::default() }
    }

    pub fn failing(message: &str) -> Self {
        Self { fail_with: Some(message.to_string()), ..Self::default() }
    }

    pub fn aggregations(&self) -> Vec<(String, Vec<Value>)> {
        self.aggregations.lock().expect("lock").clone()
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Value],
    ) -> Result<Vec<Value>, StoreError> {
        self.aggregations
            .lock()
            .expect("lock")
            .push((collection.to_string(), pipeline.to_vec()));

        if let Some(message) = &self.fail_with {
            return Err(StoreError::Api {
                status: reqwest::StatusCode::BAD_REQUEST,
                body: message.clone(),
            });
        }
        Ok(self.rows.clone())
    }

    async fn replace_all(
        &self,
        _collection: &str,
        documents: &[Value],
    ) -> Result<u64, StoreError> {
        Ok(documents.len() as u64)
    }
}
