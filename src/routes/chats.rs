//! Chat CRUD routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::entities::{Chat, ChatStore};
use crate::error::ServerError;
use crate::schemas::chat::{
    ChatCreate, ChatDetailResponse, ChatResponse, ChatUpdate, MessageResponse,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_chats, create_chat, get_chat, update_chat, delete_chat),
    components(schemas(
        ChatCreate,
        ChatUpdate,
        ChatResponse,
        ChatDetailResponse,
        MessageResponse
    ))
)]
pub struct ChatsApi;

/// Register chat CRUD routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chats", post(create_chat).get(list_chats))
        .route(
            "/chats/{id}",
            get(get_chat).patch(update_chat).delete(delete_chat),
        )
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// List all chats, newest-updated first (`GET /api/chats`).
#[utoipa::path(
    get,
    path = "/api/chats",
    tag = "chats",
    responses(
        (status = 200, description = "Chat summaries", body = Vec<ChatResponse>),
    )
)]
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChatResponse>>, ServerError> {
    let chats = state.store.list_chats().await?;
    Ok(Json(chats.iter().map(Chat::to_response).collect()))
}

/// Create an empty chat (`POST /api/chats`).
#[utoipa::path(
    post,
    path = "/api/chats",
    tag = "chats",
    request_body = ChatCreate,
    responses(
        (status = 200, description = "Chat created", body = ChatResponse),
        (status = 400, description = "Empty title"),
    )
)]
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatCreate>,
) -> Result<Json<ChatResponse>, ServerError> {
    validate_title(&req.title)?;
    let now = Utc::now();
    let chat = Chat {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        model: req.model,
        created_at: now,
        updated_at: now,
    };
    state.store.create_chat(chat.clone()).await?;
    Ok(Json(chat.to_response()))
}

/// Fetch one chat with its ordered messages (`GET /api/chats/{id}`).
#[utoipa::path(
    get,
    path = "/api/chats/{id}",
    tag = "chats",
    params(("id" = String, Path, description = "Chat id")),
    responses(
        (status = 200, description = "Chat with messages", body = ChatDetailResponse),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ChatDetailResponse>, ServerError> {
    let chat = state
        .store
        .get_chat(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Chat not found".into()))?;
    let messages = state.store.list_messages(&id).await?;
    Ok(Json(chat.to_detail_response(messages)))
}

/// Rename a chat (`PATCH /api/chats/{id}`).
#[utoipa::path(
    patch,
    path = "/api/chats/{id}",
    tag = "chats",
    params(("id" = String, Path, description = "Chat id")),
    request_body = ChatUpdate,
    responses(
        (status = 200, description = "Chat renamed", body = ChatResponse),
        (status = 400, description = "Empty title"),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn update_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ChatUpdate>,
) -> Result<Json<ChatResponse>, ServerError> {
    validate_title(&req.title)?;
    if !state.store.rename_chat(&id, &req.title).await? {
        return Err(ServerError::NotFound("Chat not found".into()));
    }
    let chat = state
        .store
        .get_chat(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Chat not found".into()))?;
    Ok(Json(chat.to_response()))
}

/// Delete a chat and all of its messages (`DELETE /api/chats/{id}`).
#[utoipa::path(
    delete,
    path = "/api/chats/{id}",
    tag = "chats",
    params(("id" = String, Path, description = "Chat id")),
    responses(
        (status = 200, description = "Chat deleted", body = serde_json::Value),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if !state.store.delete_chat(&id).await? {
        return Err(ServerError::NotFound("Chat not found".into()));
    }
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

fn validate_title(title: &str) -> Result<(), ServerError> {
    if title.trim().is_empty() {
        return Err(ServerError::BadRequest("title must not be empty".into()));
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
