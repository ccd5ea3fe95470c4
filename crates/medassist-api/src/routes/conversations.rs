use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use medassist_core::models::conversation::{Conversation, ConversationMessage, ConversationSummary};
use medassist_storage::conversations;

use crate::error::ApiError;
use crate::extract::PathParam;
use crate::state::AppState;

pub async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let summaries = conversations::list_summaries(&state.s3, &state.bucket).await?;
    Ok(Json(summaries))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Conversation>, ApiError> {
    let doc = conversations::load(&state.s3, &state.bucket, id).await?;
    Ok(Json(doc.value))
}

pub async fn get_messages(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Vec<ConversationMessage>>, ApiError> {
    let doc = conversations::load(&state.s3, &state.bucket, id).await?;
    Ok(Json(doc.value.messages()))
}

pub async fn delete_conversation(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError> {
    conversations::delete(&state.s3, &state.bucket, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
