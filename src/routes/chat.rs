//! Streaming chat endpoints.
//!
//! Both endpoints resolve the provider and credential up front and reject
//! the request before any stream is opened when a required API key is
//! missing. Once streaming has begun the response never turns into an HTTP
//! error: provider failures are folded into the assistant text as a readable
//! notice so the client always receives a terminated, well-formed stream.
//!
//! `POST /api/chat/{chat_id}` additionally persists the conversation. The
//! chat row mutation and the user/assistant message pair are committed in
//! one transaction after the stream ends; a client that disconnects
//! mid-stream drops the generator before that point, so partial output is
//! discarded rather than saved.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use futures::StreamExt;
use serde_json::json;
use tracing::{error, warn};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::entities::{
    Chat, ChatMessage, ChatStore, Exchange, ExchangeTarget, MessageRole, SettingsStore,
};
use crate::error::ServerError;
use crate::llm::{LlmClient, Provider};
use crate::schemas::chat::ChatRequest;
use crate::state::AppState;

/// Sentinel chat id that requests a fresh conversation.
const NEW_CHAT: &str = "new";

/// Terminal sentinel closing every stream.
const DONE: &str = "[DONE]";

/// New-chat titles keep this many leading code points of the user message.
const TITLE_MAX_CHARS: usize = 50;

const STREAM_OPEN_NOTICE: &str =
    "\n\nThe model provider could not be reached. Please check the connection and try again.";
const STREAM_ERROR_NOTICE: &str =
    "\n\nAn error occurred while generating the response. Please try again.";

#[derive(OpenApi)]
#[openapi(paths(chat, chat_with_save), components(schemas(ChatRequest)))]
pub struct ChatApi;

/// Register streaming chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/{chat_id}", post(chat_with_save))
}

/// Ephemeral streaming chat (`POST /api/chat`). Nothing is persisted.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "SSE stream of content frames ending with [DONE]"),
        (status = 400, description = "API key for the selected provider is not configured"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ServerError> {
    let client = resolve_client(&state, &req.model).await?;
    let ChatRequest { message, model } = req;

    let stream = async_stream::stream! {
        match client.stream(&message, &model).await {
            Ok(mut fragments) => {
                while let Some(fragment) = fragments.next().await {
                    match fragment {
                        Ok(text) => yield Ok::<Event, Infallible>(content_event(&text)),
                        Err(e) => {
                            warn!(error = %e, "provider stream failed mid-response");
                            yield Ok(content_event(STREAM_ERROR_NOTICE));
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "provider stream could not be opened");
                yield Ok::<Event, Infallible>(content_event(STREAM_OPEN_NOTICE));
            }
        }
        yield Ok(Event::default().data(DONE));
    };

    Ok(Sse::new(stream).into_response())
}

/// Streaming chat with persistence (`POST /api/chat/{chat_id}`).
///
/// `chat_id` may be the literal `"new"`, in which case a fresh conversation
/// id is generated and announced as a `chat_created` event before the first
/// content frame; any other id must name an existing chat.
#[utoipa::path(
    post,
    path = "/api/chat/{chat_id}",
    tag = "chat",
    request_body = ChatRequest,
    params(("chat_id" = String, Path, description = "Existing chat id, or \"new\"")),
    responses(
        (status = 200, description = "SSE stream of content frames ending with [DONE]"),
        (status = 400, description = "API key for the selected provider is not configured"),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn chat_with_save(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ServerError> {
    let client = resolve_client(&state, &req.model).await?;

    let is_new = chat_id == NEW_CHAT;
    let chat_id = if is_new {
        Uuid::new_v4().to_string()
    } else {
        chat_id
    };
    if !is_new {
        state
            .store
            .get_chat(&chat_id)
            .await?
            .ok_or_else(|| ServerError::NotFound("Chat not found".into()))?;
    }

    let store = Arc::clone(&state.store);
    let ChatRequest { message, model } = req;
    let received_at = Utc::now();

    let stream = async_stream::stream! {
        // Announce the identity of a fresh conversation before any token so
        // the client can bind to it immediately.
        if is_new {
            yield Ok::<Event, Infallible>(
                Event::default()
                    .event("chat_created")
                    .data(json!({ "chat_id": chat_id }).to_string()),
            );
        }

        let mut transcript = String::new();
        match client.stream(&message, &model).await {
            Ok(mut fragments) => {
                while let Some(fragment) = fragments.next().await {
                    match fragment {
                        Ok(text) => {
                            transcript.push_str(&text);
                            yield Ok(content_event(&text));
                        }
                        Err(e) => {
                            warn!(error = %e, "provider stream failed mid-response");
                            transcript.push_str(STREAM_ERROR_NOTICE);
                            yield Ok(content_event(STREAM_ERROR_NOTICE));
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "provider stream could not be opened");
                transcript.push_str(STREAM_OPEN_NOTICE);
                yield Ok::<Event, Infallible>(content_event(STREAM_OPEN_NOTICE));
            }
        }

        let completed_at = Utc::now();
        let target = if is_new {
            ExchangeTarget::New(Chat {
                id: chat_id.clone(),
                title: title_from_message(&message),
                model: model.clone(),
                created_at: received_at,
                updated_at: completed_at,
            })
        } else {
            ExchangeTarget::Existing {
                id: chat_id.clone(),
                updated_at: completed_at,
            }
        };
        let exchange = Exchange {
            target,
            user: ChatMessage {
                id: Uuid::new_v4().to_string(),
                chat_id: chat_id.clone(),
                role: MessageRole::User,
                content: message.clone(),
                created_at: received_at,
            },
            assistant: ChatMessage {
                id: Uuid::new_v4().to_string(),
                chat_id: chat_id.clone(),
                role: MessageRole::Assistant,
                content: transcript,
                created_at: completed_at,
            },
        };
        if let Err(e) = store.record_exchange(exchange).await {
            // The transaction rolled back; nothing was partially written.
            error!(error = %e, "failed to persist chat exchange");
            yield Ok(Event::default().data(json!({ "error": "failed to save conversation" }).to_string()));
            return;
        }

        yield Ok(Event::default().data(DONE));
    };

    Ok(Sse::new(stream).into_response())
}

/// Resolve provider and credential for `model`, failing fast with a client
/// error when a required API key is not configured.
async fn resolve_client(state: &AppState, model: &str) -> Result<LlmClient, ServerError> {
    let provider = Provider::for_model(model);
    let credential = if provider.requires_credential() {
        let key = state
            .store
            .get_settings()
            .await?
            .and_then(|s| s.credential_for(provider).map(str::to_owned));
        match key {
            Some(key) => Some(key),
            None => {
                return Err(ServerError::BadRequest(format!(
                    "API key for {provider} is not configured"
                )));
            }
        }
    } else {
        None
    };
    Ok(LlmClient::new(provider, credential)?)
}

fn content_event(text: &str) -> Event {
    Event::default().data(json!({ "content": text }).to_string())
}

/// Derive a new chat's title from the first user message.
fn title_from_message(message: &str) -> String {
    let title: String = message.chars().take(TITLE_MAX_CHARS).collect();
    if title.trim().is_empty() {
        "New chat".to_owned()
    } else {
        title
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
