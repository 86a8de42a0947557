use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which handling path produced a response. Serialized into the wire
/// payload's `type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerPath {
    DataQuery,
    General,
    Chat,
    Clarification,
}

/// One structured answer per request. The caller always receives this
/// shape; failures carry `success = false` and an `error` string rather
/// than surfacing an exception. For data queries the generated pipeline
/// rides along so the model's query translation stays auditable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub success: bool,
    #[serde(default)]
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub path: Option<HandlerPath>,
}

impl AssistantResponse {
    pub fn answer(path: HandlerPath, response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: response.into(),
            data: None,
            pipeline: None,
            error: None,
            path: Some(path),
        }
    }

    pub fn failure(path: Option<HandlerPath>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: String::new(),
            data: None,
            pipeline: None,
            error: Some(error.into()),
            path,
        }
    }

    pub fn with_data(mut self, data: Vec<Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_pipeline(mut self, pipeline: Value) -> Self {
        self.pipeline = Some(pipeline);
        self
    }
}
