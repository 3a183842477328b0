use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::llm::HostedModel;

/// One selectable model, local or hosted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    /// Approximate on-disk size, only known for local Ollama models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl From<&HostedModel> for ModelInfo {
    fn from(model: &HostedModel) -> Self {
        ModelInfo {
            id: model.id.to_owned(),
            name: model.name.to_owned(),
            provider: model.provider.to_string(),
            size: None,
        }
    }
}

/// Body of `GET /api/models`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    /// `"running"` when the local daemon answered, `"not_running"` otherwise.
    pub ollama_status: String,
}
