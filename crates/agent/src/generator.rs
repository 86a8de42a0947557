use std::sync::Arc;

use procurechat_core::domain::AggregationPipeline;
use procurechat_core::prompts::{PromptCatalog, PromptError};
use procurechat_core::schema::{COLLECTION, DATASET_SCHEMA};
use procurechat_store::client::{DocumentStore, StoreError};
use serde_json::Value;
use thiserror::Error;

use crate::llm::LlmClient;

const RAW_OUTPUT_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum QueryGenerationError {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("query generation call failed: {0}")]
    Model(#[source] anyhow::Error),
    #[error("failed to parse generated query (raw output: `{snippet}`): {source}")]
    InvalidJson { snippet: String, source: serde_json::Error },
    #[error("generated query missing `pipeline` key")]
    MissingPipelineKey,
    #[error("query execution failed: {0}")]
    Execution(#[source] StoreError),
}

/// Translates a natural-language question into an aggregation pipeline
/// and runs it against the procurement collection.
pub struct QueryGenerator {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn DocumentStore>,
    prompts: Arc<PromptCatalog>,
}

impl QueryGenerator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn DocumentStore>,
        prompts: Arc<PromptCatalog>,
    ) -> Self {
        Self { llm, store, prompts }
    }

    /// Generate a pipeline for `question`. The model's output must be a
    /// bare JSON object of the shape `{"pipeline": [...]}`; the stage
    /// list is passed through unchanged, never rewritten.
    pub async fn generate(
        &self,
        question: &str,
    ) -> Result<AggregationPipeline, QueryGenerationError> {
        let prompt = self.prompts.generate_query(DATASET_SCHEMA, question)?;
        let raw = self
            .llm
            .complete(&prompt)
            .await
            .map_err(QueryGenerationError::Model)?;
        let raw = raw.trim();

        let parsed: Value = serde_json::from_str(raw).map_err(|source| {
            QueryGenerationError::InvalidJson { snippet: snippet_of(raw), source }
        })?;
        let stages = parsed
            .get("pipeline")
            .ok_or(QueryGenerationError::MissingPipelineKey)?;

        let pipeline: AggregationPipeline = serde_json::from_value(stages.clone())
            .map_err(|source| QueryGenerationError::InvalidJson {
                snippet: snippet_of(raw),
                source,
            })?;

        tracing::debug!(
            event_name = "generator.pipeline.generated",
            stage_count = pipeline.len(),
            "aggregation pipeline generated from question"
        );
        Ok(pipeline)
    }

    /// Execute a generated pipeline against the procurement collection.
    /// No row cap or timeout here; bounding happens at the orchestrator.
    pub async fn execute(
        &self,
        pipeline: &AggregationPipeline,
    ) -> Result<Vec<Value>, QueryGenerationError> {
        self.store
            .aggregate(COLLECTION, pipeline.stages())
            .await
            .map_err(QueryGenerationError::Execution)
    }
}

fn snippet_of(raw: &str) -> String {
    if raw.chars().count() <= RAW_OUTPUT_SNIPPET_CHARS {
        return raw.to_string();
    }
    raw.chars().take(RAW_OUTPUT_SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use procurechat_core::prompts::PromptCatalog;
    use serde_json::json;

    use crate::testing::{ScriptedLlm, ScriptedStore};

    use super::{QueryGenerationError, QueryGenerator};

    fn generator(llm: ScriptedLlm, store: ScriptedStore) -> (QueryGenerator, Arc<ScriptedStore>) {
        let store = Arc::new(store);
        let generator = QueryGenerator::new(
            Arc::new(llm),
            store.clone(),
            Arc::new(PromptCatalog::new().expect("catalog")),
        );
        (generator, store)
    }

    #[tokio::test]
    async fn passes_a_well_formed_pipeline_through_unchanged() {
        let (generator, _) = generator(
            ScriptedLlm::respond_with([
                r#"{"pipeline": [{"$sort": {"total_spending": -1}}, {"$limit": 10}]}"#,
            ]),
            ScriptedStore::default(),
        );

        let pipeline = generator
            .generate("top 10 suppliers by spending")
            .await
            .expect("pipeline");

        assert_eq!(
            pipeline.stages(),
            &[json!({"$sort": {"total_spending": -1}}), json!({"$limit": 10})]
        );
    }

    #[tokio::test]
    async fn malformed_json_is_a_generation_error() {
        let (generator, _) =
            generator(ScriptedLlm::respond_with(["not json"]), ScriptedStore::default());

        let error = generator.generate("anything").await.err().expect("error");

        match error {
            QueryGenerationError::InvalidJson { snippet, .. } => {
                assert_eq!(snippet, "not json");
            }
            other => panic!("expected InvalidJson, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_pipeline_key_is_a_distinct_error() {
        let (generator, _) = generator(
            ScriptedLlm::respond_with([r#"{"stages": []}"#]),
            ScriptedStore::default(),
        );

        let error = generator.generate("anything").await.err().expect("error");

        assert!(matches!(error, QueryGenerationError::MissingPipelineKey));
    }

    #[tokio::test]
    async fn non_array_pipeline_value_is_invalid() {
        let (generator, _) = generator(
            ScriptedLlm::respond_with([r#"{"pipeline": "oops"}"#]),
            ScriptedStore::default(),
        );

        let error = generator.generate("anything").await.err().expect("error");

        assert!(matches!(error, QueryGenerationError::InvalidJson { .. }));
    }

    #[tokio::test]
    async fn model_failure_raises_instead_of_returning_nothing() {
        let llm = ScriptedLlm::default();
        llm.push_err("timeout");
        let (generator, _) = generator(llm, ScriptedStore::default());

        let error = generator.generate("anything").await.err().expect("error");

        assert!(matches!(error, QueryGenerationError::Model(_)));
    }

    #[tokio::test]
    async fn execute_targets_the_procurement_collection() {
        let rows = vec![json!({"_id": "2013/2014", "total_spending": 42.0})];
        let (generator, store) = generator(
            ScriptedLlm::respond_with([r#"{"pipeline": [{"$limit": 1}]}"#]),
            ScriptedStore::with_rows(rows.clone()),
        );

        let pipeline = generator.generate("spending by year").await.expect("pipeline");
        let results = generator.execute(&pipeline).await.expect("rows");

        assert_eq!(results, rows);
        let aggregations = store.aggregations();
        assert_eq!(aggregations.len(), 1);
        assert_eq!(aggregations[0].0, "procurement_data");
        assert_eq!(aggregations[0].1, vec![json!({"$limit": 1})]);
    }

    #[tokio::test]
    async fn store_failure_is_wrapped_with_execution_context() {
        let (generator, _) = generator(
            ScriptedLlm::respond_with([r#"{"pipeline": [{"$limit": 1}]}"#]),
            ScriptedStore::failing("unknown operator"),
        );

        let pipeline = generator.generate("anything").await.expect("pipeline");
        let error = generator.execute(&pipeline).await.err().expect("error");

        assert!(matches!(error, QueryGenerationError::Execution(_)));
        assert!(error.to_string().starts_with("query execution failed"));
    }
}
