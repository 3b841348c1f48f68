//! # API Route Handlers
//!
//! The Axum handlers for `agrobot-server`: the knowledge-base chatbot, the
//! rule-based companion and the knowledge base reload.

use crate::{errors::AppError, state::AppState};
use agrobot::{knowledge::try_load, UserProfile};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

// --- API Payloads ---

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub profile: UserProfile,
}

#[derive(Deserialize)]
pub struct RulesRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Serialize, Deserialize)]
pub struct ReloadResponse {
    pub keywords: usize,
}

// --- Handlers ---

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "agrobot server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Answers a question from the knowledge base, escalating to the model if needed.
pub async fn chat_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Json<ChatResponse> {
    info!(chars = payload.message.chars().count(), "Received chat message");
    let response = app_state
        .processor
        .process_message(&payload.profile, &payload.message)
        .await;
    Json(ChatResponse { response })
}

/// Answers from the rule-based responder.
pub async fn rules_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<RulesRequest>,
) -> Json<ChatResponse> {
    let response = app_state.responder.respond(&payload.message).to_string();
    Json(ChatResponse { response })
}

/// Re-reads the knowledge base file and swaps it in.
///
/// Unlike startup, a file that cannot be read or parsed is reported and the
/// current knowledge base stays in effect.
pub async fn reload_handler(
    State(app_state): State<AppState>,
) -> Result<Json<ReloadResponse>, AppError> {
    let path = app_state.kb_path.clone();
    info!(path = %path.display(), "Reloading knowledge base");
    let kb = tokio::task::spawn_blocking(move || try_load(path))
        .await
        .map_err(anyhow::Error::from)??;

    let keywords = kb.len();
    app_state.processor.knowledge().swap(kb);
    info!(keywords, "Knowledge base swapped in");
    Ok(Json(ReloadResponse { keywords }))
}
