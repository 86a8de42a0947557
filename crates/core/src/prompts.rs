//! Named prompt templates for every model call.
//!
//! Prompt text lives here as tera templates with enumerated
//! placeholders, so prompt construction is testable without touching
//! the text-generation client. Template wording deliberately stays
//! close to the assistant's production prompts: strict JSON output
//! instructions for the classifier and query generator, and a shared
//! system preamble for the answer-producing paths.

use tera::{Context, Tera};
use thiserror::Error;

const SYSTEM_CONTEXT: &str = r#"You are a procurement assistant who helps users understand and analyze California state procurement data.
You can both answer general questions about procurement and analyze specific data from the database.

The data includes:
- Purchase orders from California state departments
- Supplier information including small business and veteran-owned business status
- Different types of acquisitions (IT Goods, IT Services, Non-IT Goods, Non-IT Services)
- Financial details like unit price and total price
- Temporal information including fiscal years

Key capabilities:
1. Answer general questions about procurement processes
2. Explain terminology and concepts
3. Query and analyze procurement data
4. Provide insights and recommendations"#;

const CLASSIFY: &str = r#"Given this user message, determine if it:
1. Requires querying the procurement database
2. Is a general question about procurement
3. Is a conversation/chat message
4. Needs clarification

User message: {{ message }}

Respond ONLY with a JSON object in this exact format with no other text before or after the opening or closing brackets:
{% raw %}{"type": "query|general|chat|clarify", "requires_data": true|false}{% endraw %}

Expected output: {% raw %}{"type": "query", "requires_data": true}{% endraw %}"#;

const GENERATE_QUERY: &str = r#"You are a query generator for a procurement data analysis system backed by a document database.
Using the provided schema, generate an aggregation pipeline that answers the user's question.

Schema Information:
{{ schema }}

Consider:
1. Use proper aggregation operators ($match, $group, $sort, etc.)
2. Handle date fields properly (use $dateToString when displaying dates)
3. Format numbers appropriately (use $sum, $avg as needed)
4. Include proper sorting based on the question
5. Limit results if appropriate

User Question: {{ question }}

The output must be a valid aggregation pipeline in this format:
{% raw %}{"pipeline": [{"$stage": {"field": "value"}}]}{% endraw %}

Do not include ``` fences or any surrounding text, only return a JSON object directly."#;

const SUMMARIZE_RESULTS: &str = r#"{% include "system_context" %}

Given this user question: "{{ question }}"
And these query results: {{ results }}

Generate a natural language response that:
1. Directly answers the question
2. Highlights key findings
3. Includes relevant statistics
4. Provides business context
5. Formats numbers and dates clearly
6. Mentions any limitations in the data

Keep the response concise but informative."#;

const GENERAL: &str = r#"{% include "system_context" %}

Using your knowledge about procurement and the California state procurement system, answer this question:
{{ message }}

Provide a clear, informative response that:
1. Directly addresses the question
2. Includes relevant context
3. Uses procurement terminology appropriately
4. Mentions if specific data would help answer the question better"#;

const CHAT: &str = r#"{% include "system_context" %}

As a helpful procurement assistant, respond to this message:
{{ message }}

Maintain a professional but friendly tone. If the conversation could benefit from focusing on procurement topics, gently guide it in that direction."#;

const CLARIFY: &str = r#"{% include "system_context" %}

Create a response that:
1. Acknowledges the user's message: {{ message }}
2. Explains what's unclear
3. Asks specific questions to clarify their needs
4. Suggests possible interpretations"#;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt template registration failed: {0}")]
    Register(#[source] tera::Error),
    #[error("prompt template `{name}` failed to render: {source}")]
    Render { name: &'static str, source: tera::Error },
}

/// All prompt templates, registered once at startup and shared.
pub struct PromptCatalog {
    templates: Tera,
}

impl PromptCatalog {
    pub fn new() -> Result<Self, PromptError> {
        let mut templates = Tera::default();
        templates
            .add_raw_templates([
                ("system_context", SYSTEM_CONTEXT),
                ("classify", CLASSIFY),
                ("generate_query", GENERATE_QUERY),
                ("summarize_results", SUMMARIZE_RESULTS),
                ("general", GENERAL),
                ("chat", CHAT),
                ("clarify", CLARIFY),
            ])
            .map_err(PromptError::Register)?;
        Ok(Self { templates })
    }

    pub fn classify(&self, message: &str) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("message", message);
        self.render("classify", &context)
    }

    pub fn generate_query(&self, schema: &str, question: &str) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("schema", schema);
        context.insert("question", question);
        self.render("generate_query", &context)
    }

    pub fn summarize_results(&self, question: &str, results: &str) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("question", question);
        context.insert("results", results);
        self.render("summarize_results", &context)
    }

    pub fn general(&self, message: &str) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("message", message);
        self.render("general", &context)
    }

    pub fn chat(&self, message: &str) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("message", message);
        self.render("chat", &context)
    }

    pub fn clarify(&self, message: &str) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("message", message);
        self.render("clarify", &context)
    }

    fn render(&self, name: &'static str, context: &Context) -> Result<String, PromptError> {
        self.templates
            .render(name, context)
            .map_err(|source| PromptError::Render { name, source })
    }
}
