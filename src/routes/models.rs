//! Model discovery.
//!
//! Merges locally pulled Ollama models (queried live from the daemon) with
//! the static hosted catalog for every provider whose API key is configured.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::debug;
use utoipa::OpenApi;

use crate::entities::SettingsStore;
use crate::error::ServerError;
use crate::llm::{Provider, hosted_models};
use crate::schemas::models::{ModelInfo, ModelsResponse};
use crate::state::AppState;

const OLLAMA_TAGS_TIMEOUT: Duration = Duration::from_secs(5);

const GIB: f64 = (1024 * 1024 * 1024) as f64;

#[derive(OpenApi)]
#[openapi(paths(list_models), components(schemas(ModelInfo, ModelsResponse)))]
pub struct ModelsApi;

/// Register model discovery routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/models", get(list_models))
}

/// List selectable models (`GET /api/models`).
#[utoipa::path(
    get,
    path = "/api/models",
    tag = "models",
    responses(
        (status = 200, description = "Local and hosted models", body = ModelsResponse),
    )
)]
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelsResponse>, ServerError> {
    let mut models = Vec::new();
    let mut ollama_status = "running";

    match fetch_ollama_tags(&state.config.ollama_url).await {
        Ok(local) => models.extend(local),
        Err(e) => {
            debug!(error = %e, "local inference daemon unreachable");
            ollama_status = "not_running";
        }
    }

    if let Some(settings) = state.store.get_settings().await? {
        for provider in Provider::HOSTED {
            if settings.credential_for(provider).is_some() {
                models.extend(hosted_models(provider).map(ModelInfo::from));
            }
        }
    }

    Ok(Json(ModelsResponse {
        models,
        ollama_status: ollama_status.to_owned(),
    }))
}

#[derive(Debug, Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaTag {
    name: String,
    #[serde(default)]
    size: u64,
}

async fn fetch_ollama_tags(base_url: &str) -> Result<Vec<ModelInfo>, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(OLLAMA_TAGS_TIMEOUT)
        .build()?;
    let tags: OllamaTags = client
        .get(format!("{base_url}/api/tags"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(tags
        .models
        .into_iter()
        .map(|tag| {
            let size_gb = (tag.size as f64 / GIB * 10.0).round() / 10.0;
            ModelInfo {
                id: tag.name.clone(),
                name: tag.name,
                provider: Provider::Ollama.to_string(),
                size: (size_gb > 0.0).then(|| format!("{size_gb:.1}GB")),
            }
        })
        .collect())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
