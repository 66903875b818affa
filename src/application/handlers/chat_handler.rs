use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{json_body, AppState};
use crate::domain::entities::ChatLogEntry;
use crate::domain::errors::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// Answer a market question from the canned topic table
pub async fn post_chat(
    State(service): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = json_body(payload)?;
    let answer = service.chat(&request.question).await?;
    Ok(Json(ChatResponse { answer }))
}

/// Logged questions and answers, newest first
pub async fn list_chat_messages(
    State(service): State<AppState>,
) -> Result<Json<Vec<ChatLogEntry>>, ApiError> {
    Ok(Json(service.chat_messages().await?))
}
