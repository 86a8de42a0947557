use std::time::Duration;

use async_trait::async_trait;
use procurechat_core::config::StoreConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store API error {status}: {body}")]
    Api { status: reqwest::StatusCode, body: String },
    #[error("store response decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

/// The two operations the assistant needs from the document database.
///
/// Shared, read-mostly collaborator: implementations must be safe to
/// call from concurrent request tasks without external locking.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run an aggregation pipeline against `collection` and return the
    /// resulting documents.
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Value],
    ) -> Result<Vec<Value>, StoreError>;

    /// Replace the full contents of `collection` with `documents`,
    /// returning the number of documents written.
    async fn replace_all(
        &self,
        collection: &str,
        documents: &[Value],
    ) -> Result<u64, StoreError>;
}

/// HTTP client for the document database's Data API.
///
/// Every operation is a `POST {base_url}/action/<name>` with the data
/// source, database, and collection in the body and an optional
/// `api-key` header.
pub struct DataApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    data_source: String,
    database: String,
}

#[derive(Debug, Serialize)]
struct AggregateRequest<'a> {
    #[serde(rename = "dataSource")]
    data_source: &'a str,
    database: &'a str,
    collection: &'a str,
    pipeline: &'a [Value],
}

#[derive(Debug, Deserialize)]
struct AggregateResponse {
    documents: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct DeleteManyRequest<'a> {
    #[serde(rename = "dataSource")]
    data_source: &'a str,
    database: &'a str,
    collection: &'a str,
    filter: Value,
}

#[derive(Debug, Serialize)]
struct InsertManyRequest<'a> {
    #[serde(rename = "dataSource")]
    data_source: &'a str,
    database: &'a str,
    collection: &'a str,
    documents: &'a [Value],
}

#[derive(Debug, Deserialize)]
struct InsertManyResponse {
    #[serde(rename = "insertedIds")]
    inserted_ids: Vec<Value>,
}

impl DataApiClient {
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            data_source: config.data_source.clone(),
            database: config.database.clone(),
        })
    }

    async fn post_action<B: Serialize>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<reqwest::Response, StoreError> {
        let mut request = self
            .http
            .post(format!("{}/action/{action}", self.base_url))
            .json(body);
        if let Some(api_key) = &self.api_key {
            request = request.header("api-key", api_key.expose_secret());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }
        Ok(response)
    }
}

fn decode_payload<T: DeserializeOwned>(body: &str) -> Result<T, StoreError> {
    serde_json::from_str(body).map_err(StoreError::Decode)
}

#[async_trait]
impl DocumentStore for DataApiClient {
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Value],
    ) -> Result<Vec<Value>, StoreError> {
        let request = AggregateRequest {
            data_source: &self.data_source,
            database: &self.database,
            collection,
            pipeline,
        };

        let response = self.post_action("aggregate", &request).await?;
        let payload: AggregateResponse = decode_payload(&response.text().await?)?;

        tracing::debug!(
            event_name = "store.aggregate.completed",
            collection,
            stage_count = pipeline.len(),
            row_count = payload.documents.len(),
            "aggregation pipeline executed"
        );
        Ok(payload.documents)
    }

    async fn replace_all(
        &self,
        collection: &str,
        documents: &[Value],
    ) -> Result<u64, StoreError> {
        let delete = DeleteManyRequest {
            data_source: &self.data_source,
            database: &self.database,
            collection,
            filter: Value::Object(serde_json::Map::new()),
        };
        self.post_action("deleteMany", &delete).await?;

        if documents.is_empty() {
            return Ok(0);
        }

        let insert = InsertManyRequest {
            data_source: &self.data_source,
            database: &self.database,
            collection,
            documents,
        };
        let response = self.post_action("insertMany", &insert).await?;
        let payload: InsertManyResponse = decode_payload(&response.text().await?)?;

        tracing::info!(
            event_name = "store.replace_all.completed",
            collection,
            record_count = payload.inserted_ids.len(),
            "collection contents replaced"
        );
        Ok(payload.inserted_ids.len() as u64)
    }
}
