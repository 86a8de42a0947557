use std::sync::Arc;

use anyhow::{Context, Result};
use procurechat_core::config::AssistantConfig;
use procurechat_core::domain::{AssistantResponse, HandlerPath, MessageKind};
use procurechat_core::prompts::PromptCatalog;
use procurechat_store::client::DocumentStore;
use uuid::Uuid;

use crate::classifier::MessageClassifier;
use crate::generator::QueryGenerator;
use crate::llm::LlmClient;
use crate::validator::validate_for_execution;

/// Orchestrator tunables, lifted from [`AssistantConfig`].
#[derive(Clone, Copy, Debug)]
pub struct AssistantOptions {
    pub max_result_rows: usize,
    pub summary_snippet_chars: usize,
    pub enforce_validation: bool,
}

impl From<&AssistantConfig> for AssistantOptions {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            max_result_rows: config.max_result_rows,
            summary_snippet_chars: config.summary_snippet_chars,
            enforce_validation: config.enforce_validation,
        }
    }
}

/// Routes each message to one of four terminal handling paths based on
/// the classifier's verdict. Every path catches its own failures:
/// `process_message` always hands the shell a structured response,
/// never an error.
pub struct ProcurementAssistant {
    classifier: MessageClassifier,
    generator: QueryGenerator,
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptCatalog>,
    options: AssistantOptions,
}

impl ProcurementAssistant {
    /// `llm_precise` drives classification and query translation
    /// (deterministic sampling); `llm_chat` drives the answer-producing
    /// paths.
    pub fn new(
        llm_precise: Arc<dyn LlmClient>,
        llm_chat: Arc<dyn LlmClient>,
        store: Arc<dyn DocumentStore>,
        prompts: Arc<PromptCatalog>,
        options: AssistantOptions,
    ) -> Self {
        Self {
            classifier: MessageClassifier::new(llm_precise.clone(), prompts.clone()),
            generator: QueryGenerator::new(llm_precise, store, prompts.clone()),
            llm: llm_chat,
            prompts,
            options,
        }
    }

    /// Sole entry point consumed by the request shell.
    pub async fn process_message(&self, message: &str) -> AssistantResponse {
        let correlation_id = Uuid::new_v4();
        let verdict = self.classifier.classify(message).await;

        tracing::info!(
            event_name = "assistant.message.classified",
            correlation_id = %correlation_id,
            kind = ?verdict.kind,
            requires_data = verdict.requires_data,
            "message classified"
        );

        let response = match verdict.kind {
            MessageKind::Query => self.handle_data_query(message).await,
            MessageKind::General => self.handle_prompt_path(HandlerPath::General, message).await,
            MessageKind::Chat => self.handle_prompt_path(HandlerPath::Chat, message).await,
            MessageKind::Clarify => {
                self.handle_prompt_path(HandlerPath::Clarification, message).await
            }
        };

        if !response.success {
            tracing::warn!(
                event_name = "assistant.message.failed",
                correlation_id = %correlation_id,
                path = ?response.path,
                error = response.error.as_deref().unwrap_or("unknown"),
                "message handling degraded to an error payload"
            );
        }
        response
    }

    async fn handle_data_query(&self, message: &str) -> AssistantResponse {
        match self.run_data_query(message).await {
            Ok(response) => response,
            Err(error) => {
                AssistantResponse::failure(Some(HandlerPath::DataQuery), format!("{error:#}"))
            }
        }
    }

    async fn run_data_query(&self, message: &str) -> Result<AssistantResponse> {
        let pipeline = self.generator.generate(message).await?;

        if self.options.enforce_validation && !validate_for_execution(&pipeline) {
            anyhow::bail!("generated pipeline contains operators outside the allow-list");
        }

        let rows = self.generator.execute(&pipeline).await?;

        // The summary prompt sees a bounded rendering of the full result
        // set; the caller gets at most max_result_rows rows.
        let rendering = render_rows(&rows, self.options.summary_snippet_chars)?;
        let prompt = self.prompts.summarize_results(message, &rendering)?;
        let summary = self
            .llm
            .complete(&prompt)
            .await
            .context("summary generation failed")?;

        let mut data = rows;
        data.truncate(self.options.max_result_rows);

        Ok(AssistantResponse::answer(HandlerPath::DataQuery, summary)
            .with_data(data)
            .with_pipeline(serde_json::to_value(&pipeline)?))
    }

    async fn handle_prompt_path(&self, path: HandlerPath, message: &str) -> AssistantResponse {
        let rendered = match path {
            HandlerPath::General => self.prompts.general(message),
            HandlerPath::Chat => self.prompts.chat(message),
            HandlerPath::Clarification => self.prompts.clarify(message),
            HandlerPath::DataQuery => unreachable!("data queries use run_data_query"),
        };

        let prompt = match rendered {
            Ok(prompt) => prompt,
            Err(error) => return AssistantResponse::failure(Some(path), error.to_string()),
        };

        match self.llm.complete(&prompt).await {
            Ok(text) => AssistantResponse::answer(path, text),
            Err(error) => AssistantResponse::failure(Some(path), format!("{error:#}")),
        }
    }
}

fn render_rows(rows: &[serde_json::Value], limit_chars: usize) -> Result<String> {
    let rendered = serde_json::to_string(rows).context("could not render result rows")?;
    if rendered.chars().count() <= limit_chars {
        return Ok(rendered);
    }
    Ok(rendered.chars().take(limit_chars).collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use procurechat_core::domain::HandlerPath;
    use procurechat_core::prompts::PromptCatalog;
    use serde_json::json;

    use crate::testing::{ScriptedLlm, ScriptedStore};

    use super::{AssistantOptions, ProcurementAssistant};

    const OPTIONS: AssistantOptions = AssistantOptions {
        max_result_rows: 50,
        summary_snippet_chars: 1500,
        enforce_validation: true,
    };

    fn assistant(
        precise: ScriptedLlm,
        chat: ScriptedLlm,
        store: ScriptedStore,
        options: AssistantOptions,
    ) -> (ProcurementAssistant, Arc<ScriptedLlm>, Arc<ScriptedLlm>, Arc<ScriptedStore>) {
        let precise = Arc::new(precise);
        let chat = Arc::new(chat);
        let store = Arc::new(store);
        let assistant = ProcurementAssistant::new(
            precise.clone(),
            chat.clone(),
            store.clone(),
            Arc::new(PromptCatalog::new().expect("catalog")),
            options,
        );
        (assistant, precise, chat, store)
    }

    #[tokio::test]
    async fn chat_message_never_touches_the_query_generator_or_store() {
        let (assistant, precise, chat, store) = assistant(
            ScriptedLlm::respond_with([r#"{"type": "chat", "requires_data": false}"#]),
            ScriptedLlm::respond_with(["Hello! I'm doing well. Ask me about procurement."]),
            ScriptedStore::default(),
            OPTIONS,
        );

        let response = assistant.process_message("Hello, how are you?").await;

        assert!(response.success);
        assert_eq!(response.path, Some(HandlerPath::Chat));
        assert!(response.data.is_none());
        assert!(store.aggregations().is_empty());
        // precise llm saw only the classification prompt
        assert_eq!(precise.prompts().len(), 1);
        let chat_prompts = chat.prompts();
        assert_eq!(chat_prompts.len(), 1);
        assert!(chat_prompts[0].contains("respond to this message"));
    }

    #[tokio::test]
    async fn query_message_drives_generate_execute_summarize_in_order() {
        let (assistant, precise, chat, store) = assistant(
            ScriptedLlm::respond_with([
                r#"{"type": "query", "requires_data": true}"#,
                r#"{"pipeline": [{"$group": {"_id": "$fiscal_year", "total_spending": {"$sum": "$total_price"}}}]}"#,
            ]),
            ScriptedLlm::respond_with(["Total spending in 2013/2014 was $1.2M."]),
            ScriptedStore::with_rows(vec![json!({"_id": "2013/2014", "total_spending": 1_200_000.0})]),
            OPTIONS,
        );

        let response = assistant
            .process_message("What was total spending in fiscal year 2013/2014?")
            .await;

        assert!(response.success);
        assert_eq!(response.path, Some(HandlerPath::DataQuery));
        assert_eq!(response.response, "Total spending in 2013/2014 was $1.2M.");
        assert_eq!(
            response.data,
            Some(vec![json!({"_id": "2013/2014", "total_spending": 1_200_000.0})])
        );
        assert!(response.pipeline.is_some());

        // generation happened against the store exactly once
        assert_eq!(store.aggregations().len(), 1);

        // precise llm: classify then generate; chat llm: summarize only
        let precise_prompts = precise.prompts();
        assert_eq!(precise_prompts.len(), 2);
        assert!(precise_prompts[1].contains("aggregation pipeline"));
        let chat_prompts = chat.prompts();
        assert_eq!(chat_prompts.len(), 1);
        assert!(chat_prompts[0].contains("query results"));
        assert!(!chat_prompts[0].contains("gently guide"));
    }

    #[tokio::test]
    async fn data_rows_are_capped_and_the_summary_snippet_is_bounded() {
        let rows: Vec<_> = (0..500)
            .map(|index| json!({"supplier_name": format!("Supplier {index}"), "total_spending": index}))
            .collect();

        let (assistant, _, chat, _) = assistant(
            ScriptedLlm::respond_with([
                r#"{"type": "query", "requires_data": true}"#,
                r#"{"pipeline": [{"$sort": {"total_spending": -1}}]}"#,
            ]),
            ScriptedLlm::respond_with(["Here are the top suppliers."]),
            ScriptedStore::with_rows(rows),
            OPTIONS,
        );

        let response = assistant.process_message("top suppliers by spending").await;

        assert!(response.success);
        assert_eq!(response.data.as_ref().map(Vec::len), Some(50));

        // the rendering embedded in the summary prompt is capped at 1500 chars
        let summary_prompt = &chat.prompts()[0];
        let rendering_start = summary_prompt
            .find("And these query results: ")
            .expect("summary prompt carries results");
        let rendering = &summary_prompt[rendering_start..];
        let rendering_line = rendering.lines().next().expect("one line");
        assert!(rendering_line.chars().count() <= "And these query results: ".len() + 1500);
    }

    #[tokio::test]
    async fn date_range_pipeline_executes_under_the_default_gate() {
        let (assistant, _, _, store) = assistant(
            ScriptedLlm::respond_with([
                r#"{"type": "query", "requires_data": true}"#,
                r#"{"pipeline": [
                    {"$match": {"$expr": {"$gte": [
                        {"$dateFromString": {"dateString": "$purchase_date", "format": "%m/%d/%Y"}},
                        {"$dateFromString": {"dateString": "01/01/2013", "format": "%m/%d/%Y"}}
                    ]}}},
                    {"$group": {"_id": null, "total_spending": {"$sum": "$total_price"}}}
                ]}"#,
            ]),
            ScriptedLlm::respond_with(["Spending since January 2013 totals $4.2M."]),
            ScriptedStore::with_rows(vec![json!({"_id": null, "total_spending": 4_200_000.0})]),
            OPTIONS,
        );

        let response = assistant
            .process_message("How much was spent on purchases after January 1, 2013?")
            .await;

        assert!(response.success);
        assert_eq!(response.path, Some(HandlerPath::DataQuery));
        assert_eq!(store.aggregations().len(), 1);
    }

    #[tokio::test]
    async fn disallowed_operators_block_execution_when_validation_is_enforced() {
        let (assistant, _, _, store) = assistant(
            ScriptedLlm::respond_with([
                r#"{"type": "query", "requires_data": true}"#,
                r#"{"pipeline": [{"$merge": {"into": "other"}}]}"#,
            ]),
            ScriptedLlm::default(),
            ScriptedStore::default(),
            OPTIONS,
        );

        let response = assistant.process_message("copy everything somewhere else").await;

        assert!(!response.success);
        assert_eq!(response.path, Some(HandlerPath::DataQuery));
        assert!(response.error.as_deref().expect("error").contains("allow-list"));
        assert!(store.aggregations().is_empty());
    }

    #[tokio::test]
    async fn validation_can_be_disabled_to_keep_the_validator_advisory() {
        let (assistant, _, _, store) = assistant(
            ScriptedLlm::respond_with([
                r#"{"type": "query", "requires_data": true}"#,
                r#"{"pipeline": [{"$merge": {"into": "other"}}]}"#,
            ]),
            ScriptedLlm::respond_with(["Done."]),
            ScriptedStore::with_rows(vec![]),
            AssistantOptions { enforce_validation: false, ..OPTIONS },
        );

        let response = assistant.process_message("copy everything somewhere else").await;

        assert!(response.success);
        assert_eq!(store.aggregations().len(), 1);
    }

    #[tokio::test]
    async fn generation_failure_degrades_to_a_data_query_error_payload() {
        let (assistant, _, _, _) = assistant(
            ScriptedLlm::respond_with([
                r#"{"type": "query", "requires_data": true}"#,
                "I cannot produce a pipeline for that.",
            ]),
            ScriptedLlm::default(),
            ScriptedStore::default(),
            OPTIONS,
        );

        let response = assistant.process_message("something unanswerable").await;

        assert!(!response.success);
        assert_eq!(response.path, Some(HandlerPath::DataQuery));
        assert!(response
            .error
            .as_deref()
            .expect("error")
            .contains("failed to parse generated query"));
    }

    #[tokio::test]
    async fn execution_failure_degrades_to_a_data_query_error_payload() {
        let (assistant, _, _, _) = assistant(
            ScriptedLlm::respond_with([
                r#"{"type": "query", "requires_data": true}"#,
                r#"{"pipeline": [{"$limit": 1}]}"#,
            ]),
            ScriptedLlm::default(),
            ScriptedStore::failing("unknown field"),
            OPTIONS,
        );

        let response = assistant.process_message("anything").await;

        assert!(!response.success);
        assert!(response
            .error
            .as_deref()
            .expect("error")
            .contains("query execution failed"));
    }

    #[tokio::test]
    async fn general_question_uses_the_knowledge_only_path() {
        let (assistant, _, chat, store) = assistant(
            ScriptedLlm::respond_with([r#"{"type": "general", "requires_data": false}"#]),
            ScriptedLlm::respond_with(["An LPA is a leveraged procurement agreement."]),
            ScriptedStore::default(),
            OPTIONS,
        );

        let response = assistant.process_message("What is an LPA?").await;

        assert!(response.success);
        assert_eq!(response.path, Some(HandlerPath::General));
        assert!(store.aggregations().is_empty());
        assert!(chat.prompts()[0].contains("Using your knowledge about procurement"));
    }

    #[tokio::test]
    async fn clarify_verdict_routes_to_the_clarification_path() {
        let (assistant, _, chat, _) = assistant(
            ScriptedLlm::respond_with([r#"{"type": "clarify", "requires_data": false}"#]),
            ScriptedLlm::respond_with(["Could you say more about what you need?"]),
            ScriptedStore::default(),
            OPTIONS,
        );

        let response = assistant.process_message("it").await;

        assert!(response.success);
        assert_eq!(response.path, Some(HandlerPath::Clarification));
        assert!(chat.prompts()[0].contains("Acknowledges the user's message"));
    }

    #[tokio::test]
    async fn unclassifiable_message_falls_back_to_the_chat_path() {
        let (assistant, _, chat, store) = assistant(
            ScriptedLlm::respond_with(["garbage output, not json"]),
            ScriptedLlm::respond_with(["Happy to help with procurement questions."]),
            ScriptedStore::default(),
            OPTIONS,
        );

        let response = assistant.process_message("???").await;

        assert!(response.success);
        assert_eq!(response.path, Some(HandlerPath::Chat));
        assert!(store.aggregations().is_empty());
        assert_eq!(chat.prompts().len(), 1);
    }

    #[tokio::test]
    async fn chat_path_model_failure_degrades_to_an_error_payload() {
        let chat = ScriptedLlm::default();
        chat.push_err("upstream unavailable");
        let (assistant, _, _, _) = assistant(
            ScriptedLlm::respond_with([r#"{"type": "chat", "requires_data": false}"#]),
            chat,
            ScriptedStore::default(),
            OPTIONS,
        );

        let response = assistant.process_message("hello").await;

        assert!(!response.success);
        assert_eq!(response.path, Some(HandlerPath::Chat));
        assert!(response.error.as_deref().expect("error").contains("upstream unavailable"));
    }
}
