//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `SKIFF_ENABLE_SWAGGER=false`)
//! - Health / heartbeat route
//! - The `/api` chat, chats, models, and settings routes

mod chat;
mod chats;
pub mod doc;
mod health;
mod models;
mod settings;

use axum::{
    Router,
    middleware::{self},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(chat::router())
        .merge(chats::router())
        .merge(models::router())
        .merge(settings::router());

    let mut app = Router::new()
        .merge(health::router())
        .nest("/api", api_router);

    // ── Swagger UI ────────────────────────────────────────────────────────────
    // Enabled by default; disable with SKIFF_ENABLE_SWAGGER=false in production
    // to avoid exposing the API structure.
    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace::trace_middleware,
        ))
        .with_state(state)
}

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut spec = health::HealthApi::openapi();
    spec.merge(chat::ChatApi::openapi());
    spec.merge(chats::ChatsApi::openapi());
    spec.merge(models::ModelsApi::openapi());
    spec.merge(settings::SettingsApi::openapi());
    spec
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::Config;
    use crate::entities::{
        ChatMessage, ChatStore, Exchange, ExchangeTarget, MessageRole, SqliteStore,
    };
    use crate::state::AppState;

    async fn test_app() -> (Router, Arc<AppState>, TempDir) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let store = SqliteStore::connect(&url).await.expect("open test store");
        let state = Arc::new(AppState {
            config: Arc::new(Config {
                bind_address: "127.0.0.1:0".into(),
                database_url: url,
                // Nothing listens here; model discovery must degrade.
                ollama_url: "http://127.0.0.1:9".into(),
                log_level: "info".into(),
                log_json: false,
                enable_swagger: false,
                cors_allowed_origins: None,
            }),
            store: Arc::new(store),
        });
        (build(Arc::clone(&state)), state, dir)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(json_body) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json_body.to_string()))
                .expect("build request"),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("build request"),
        };
        let response = app.clone().oneshot(request).await.expect("send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn message(chat_id: &str, role: MessageRole, content: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4().to_string(),
            chat_id: chat_id.to_owned(),
            role,
            content: content.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _state, _guard) = test_app().await;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn chat_crud_lifecycle() {
        let (app, _state, _guard) = test_app().await;

        let (status, created) = send(
            &app,
            "POST",
            "/api/chats",
            Some(json!({ "title": "weekend plans", "model": "gemma3:1b" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["id"].as_str().expect("chat id").to_owned();
        assert_eq!(created["title"], "weekend plans");

        let (status, listed) = send(&app, "GET", "/api/chats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().expect("chat list").len(), 1);

        let (status, detail) = send(&app, "GET", &format!("/api/chats/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["title"], "weekend plans");
        assert!(detail["messages"].as_array().expect("messages").is_empty());

        let (status, renamed) = send(
            &app,
            "PATCH",
            &format!("/api/chats/{id}"),
            Some(json!({ "title": "travel notes" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["title"], "travel notes");

        let (status, deleted) = send(&app, "DELETE", &format!("/api/chats/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["status"], "deleted");

        let (status, _) = send(&app, "GET", &format!("/api/chats/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_chats_yield_404() {
        let (app, _state, _guard) = test_app().await;
        let (status, _) = send(&app, "GET", "/api/chats/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(
            &app,
            "PATCH",
            "/api/chats/nope",
            Some(json!({ "title": "t" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", "/api/chats/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_titles_are_rejected_with_400() {
        let (app, _state, _guard) = test_app().await;
        let (status, _) = send(&app, "POST", "/api/chats", Some(json!({ "title": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, created) = send(
            &app,
            "POST",
            "/api/chats",
            Some(json!({ "title": "kept" })),
        )
        .await;
        let id = created["id"].as_str().expect("chat id").to_owned();
        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/chats/{id}"),
            Some(json!({ "title": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn created_chats_default_their_model() {
        let (app, _state, _guard) = test_app().await;
        let (_, created) = send(&app, "POST", "/api/chats", Some(json!({ "title": "t" }))).await;
        assert_eq!(created["model"], "gemma3:1b");
    }

    #[tokio::test]
    async fn settings_update_and_clear_roundtrip() {
        let (app, _state, _guard) = test_app().await;

        let (status, initial) = send(&app, "GET", "/api/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(initial["openai_enabled"], false);
        assert_eq!(initial["default_model"], "gemma3:1b");

        let (_, updated) = send(
            &app,
            "PATCH",
            "/api/settings",
            Some(json!({ "openai_api_key": "sk-abcdefghijklmnop" })),
        )
        .await;
        assert_eq!(updated["openai_enabled"], true);
        assert_eq!(updated["openai_api_key"], "sk-abcde...mnop");

        // Untouched fields survive an unrelated partial update.
        let (_, touched) = send(
            &app,
            "PATCH",
            "/api/settings",
            Some(json!({ "default_model": "gpt-4o" })),
        )
        .await;
        assert_eq!(touched["openai_enabled"], true);
        assert_eq!(touched["default_model"], "gpt-4o");

        // An explicit empty string clears the credential.
        let (_, cleared) = send(
            &app,
            "PATCH",
            "/api/settings",
            Some(json!({ "openai_api_key": "" })),
        )
        .await;
        assert_eq!(cleared["openai_enabled"], false);
        assert_eq!(cleared["openai_api_key"], Value::Null);
    }

    #[tokio::test]
    async fn hosted_model_without_key_is_rejected_before_streaming() {
        let (app, _state, _guard) = test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/chat",
            Some(json!({ "message": "hi", "model": "gpt-4o" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .expect("error message")
                .contains("openai")
        );

        let (status, _) = send(
            &app,
            "POST",
            "/api/chat/new",
            Some(json!({ "message": "hi", "model": "claude-3-opus-20240229" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Nothing was created by the rejected requests.
        let (_, listed) = send(&app, "GET", "/api/chats", None).await;
        assert!(listed.as_array().expect("chat list").is_empty());
    }

    #[tokio::test]
    async fn persisted_chat_with_unknown_id_is_rejected() {
        let (app, _state, _guard) = test_app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/chat/does-not-exist",
            Some(json!({ "message": "hi", "model": "gemma3:1b" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn recorded_exchange_appends_messages_and_touches_chat() {
        let (app, state, _guard) = test_app().await;

        let (_, created) = send(
            &app,
            "POST",
            "/api/chats",
            Some(json!({ "title": "t", "model": "gemma3:1b" })),
        )
        .await;
        let id = created["id"].as_str().expect("chat id").to_owned();
        let before = state
            .store
            .get_chat(&id)
            .await
            .expect("get chat")
            .expect("chat exists");

        let later = before.updated_at + Duration::milliseconds(5);
        state
            .store
            .record_exchange(Exchange {
                target: ExchangeTarget::Existing {
                    id: id.clone(),
                    updated_at: later,
                },
                user: message(&id, MessageRole::User, "hi"),
                assistant: message(&id, MessageRole::Assistant, "hello!"),
            })
            .await
            .expect("record exchange");

        let after = state
            .store
            .get_chat(&id)
            .await
            .expect("get chat")
            .expect("chat exists");
        assert!(after.updated_at > before.updated_at);

        let (_, detail) = send(&app, "GET", &format!("/api/chats/{id}"), None).await;
        let messages = detail["messages"].as_array().expect("messages");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn deleting_a_chat_removes_its_messages() {
        let (app, state, _guard) = test_app().await;

        let (_, created) = send(
            &app,
            "POST",
            "/api/chats",
            Some(json!({ "title": "doomed", "model": "gemma3:1b" })),
        )
        .await;
        let id = created["id"].as_str().expect("chat id").to_owned();
        state
            .store
            .record_exchange(Exchange {
                target: ExchangeTarget::Existing {
                    id: id.clone(),
                    updated_at: Utc::now(),
                },
                user: message(&id, MessageRole::User, "hi"),
                assistant: message(&id, MessageRole::Assistant, "hello!"),
            })
            .await
            .expect("record exchange");

        let (status, _) = send(&app, "DELETE", &format!("/api/chats/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let orphans = state.store.list_messages(&id).await.expect("list messages");
        assert!(orphans.is_empty());
    }

    async fn send_raw(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, String, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request");
        let response = app.clone().oneshot(request).await.expect("send request");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_owned();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let text = String::from_utf8(bytes.to_vec()).expect("utf-8 body");
        (status, content_type, text)
    }

    // The provider stream either succeeds (a daemon happens to be running)
    // or fails and is folded into an in-band notice; both paths must leave a
    // well-formed, [DONE]-terminated stream and a fully persisted exchange.
    #[tokio::test]
    async fn new_chat_stream_announces_identity_before_content_and_persists() {
        let (app, state, _guard) = test_app().await;

        let (status, content_type, body) = send_raw(
            &app,
            "POST",
            "/api/chat/new",
            json!({ "message": "hi there", "model": "gemma3:1b" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/event-stream"));

        let created_pos = body.find("event: chat_created").expect("chat_created event");
        let first_content = body.find("\"content\"").expect("content frame");
        assert!(created_pos < first_content);
        assert!(body.trim_end().ends_with("data: [DONE]"));

        let chats = state.store.list_chats().await.expect("list chats");
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].title, "hi there");
        let messages = state
            .store
            .list_messages(&chats[0].id)
            .await
            .expect("list messages");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "hi there");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert!(!messages[1].content.is_empty());
    }

    #[tokio::test]
    async fn existing_chat_stream_appends_and_touches_updated_at() {
        let (app, state, _guard) = test_app().await;

        let (_, created) = send(
            &app,
            "POST",
            "/api/chats",
            Some(json!({ "title": "ongoing", "model": "gemma3:1b" })),
        )
        .await;
        let id = created["id"].as_str().expect("chat id").to_owned();
        let before = state
            .store
            .get_chat(&id)
            .await
            .expect("get chat")
            .expect("chat exists");

        let (status, _, body) = send_raw(
            &app,
            "POST",
            &format!("/api/chat/{id}"),
            json!({ "message": "and another thing", "model": "gemma3:1b" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("event: chat_created"));
        assert!(body.trim_end().ends_with("data: [DONE]"));

        let after = state
            .store
            .get_chat(&id)
            .await
            .expect("get chat")
            .expect("chat exists");
        assert!(after.updated_at > before.updated_at);
        let messages = state.store.list_messages(&id).await.expect("list messages");
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn ephemeral_chat_streams_and_persists_nothing() {
        let (app, state, _guard) = test_app().await;

        let (status, content_type, body) = send_raw(
            &app,
            "POST",
            "/api/chat",
            json!({ "message": "hi", "model": "gemma3:1b" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/event-stream"));
        assert!(body.trim_end().ends_with("data: [DONE]"));

        assert!(state.store.list_chats().await.expect("list chats").is_empty());
    }

    #[tokio::test]
    async fn models_degrade_when_daemon_is_unreachable() {
        let (app, _state, _guard) = test_app().await;
        let (status, body) = send(&app, "GET", "/api/models", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ollama_status"], "not_running");
        assert!(body["models"].as_array().expect("models").is_empty());

        // A configured credential exposes that provider's hosted catalog.
        let (_, _) = send(
            &app,
            "PATCH",
            "/api/settings",
            Some(json!({ "groq_api_key": "gsk-abcdefghijklmnop" })),
        )
        .await;
        let (_, body) = send(&app, "GET", "/api/models", None).await;
        let models = body["models"].as_array().expect("models");
        assert!(!models.is_empty());
        assert!(models.iter().all(|m| m["provider"] == "groq"));
    }
}
