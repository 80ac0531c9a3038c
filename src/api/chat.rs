use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::routes::AppState;
use crate::chat::{ChatReply, ChatRequest};
use crate::error::ApiError;

/// POST /api/chat: relay to the LLM. Upstream failures still answer 200.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload?;
    let history = request.into_history();
    if !history.iter().any(|m| m.role == "user") {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }
    Ok(Json(state.chat.reply(&history).await))
}
