use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use procurechat_agent::assistant::ProcurementAssistant;
use procurechat_core::domain::AssistantResponse;
use procurechat_core::schema::COLLECTION;
use procurechat_store::client::DocumentStore;
use procurechat_store::ingest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<ProcurementAssistant>,
    pub store: Arc<dyn DocumentStore>,
    pub dataset_path: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: HealthCheck,
    pub store: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/load-data", post(load_data))
        .route("/health", get(health))
        .with_state(state)
}

/// The chat endpoint maps `process_message` 1:1 onto the wire: the
/// caller always gets the structured `{success, response, data, error,
/// type}` payload, with a 500 status when handling degraded to an
/// error.
pub async fn chat(
    State(state): State<AppState>,
    Json(message): Json<ChatMessage>,
) -> (StatusCode, Json<AssistantResponse>) {
    let response = state.assistant.process_message(&message.message).await;
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response))
}

pub async fn load_data(
    State(state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    let bytes = match tokio::fs::read(&state.dataset_path).await {
        Ok(bytes) => bytes,
        Err(source) => {
            let status = if source.kind() == std::io::ErrorKind::NotFound {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            return (
                status,
                Json(json!({
                    "success": false,
                    "error": format!("dataset file not available at {}: {source}", state.dataset_path),
                })),
            );
        }
    };

    match ingest::load_dataset(state.store.as_ref(), bytes.as_slice()).await {
        Ok(records_count) => {
            info!(
                event_name = "server.load_data.completed",
                records_count,
                "dataset loaded into the store"
            );
            let payload = json!({
                "success": true,
                "message": format!("Successfully loaded {records_count} records into the store"),
                "records_count": records_count,
            });
            (StatusCode::OK, Json(payload))
        }
        Err(source) => {
            error!(
                event_name = "server.load_data.failed",
                error = %source,
                "dataset load failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": source.to_string()})),
            )
        }
    }
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = store_check(state.store.as_ref()).await;
    let ready = store.status == "ready";

    let payload = HealthResponse {
        status: if ready { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        service: HealthCheck {
            status: "ready",
            detail: "procurechat-server runtime initialized".to_string(),
        },
        store,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn store_check(store: &dyn DocumentStore) -> HealthCheck {
    match store.aggregate(COLLECTION, &[json!({"$limit": 1})]).await {
        Ok(_) => HealthCheck { status: "ready", detail: "store aggregation succeeded".to_string() },
        Err(source) => HealthCheck {
            status: "degraded",
            detail: format!("store aggregation failed: {source}"),
        },
    }
}
