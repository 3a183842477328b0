use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{Chat, ChatMessage};

fn default_model() -> String {
    super::DEFAULT_MODEL.to_owned()
}

/// Body of the streaming chat endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user message to relay to the model.
    pub message: String,
    /// Model identifier; also selects the provider.
    #[serde(default = "default_model")]
    pub model: String,
}

/// Body of `POST /api/chats` (create an empty chat).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatCreate {
    pub title: String,
    #[serde(default = "default_model")]
    pub model: String,
}

/// Body of `PATCH /api/chats/{id}` (rename).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatUpdate {
    pub title: String,
}

/// A chat summary as listed in the sidebar.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub id: String,
    pub title: String,
    pub model: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: String,
    pub chat_id: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// A chat together with its full ordered message list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatDetailResponse {
    pub id: String,
    pub title: String,
    pub model: String,
    pub created_at: String,
    pub updated_at: String,
    pub messages: Vec<MessageResponse>,
}

impl Chat {
    pub fn to_response(&self) -> ChatResponse {
        ChatResponse {
            id: self.id.clone(),
            title: self.title.clone(),
            model: self.model.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }

    pub fn to_detail_response(&self, messages: Vec<ChatMessage>) -> ChatDetailResponse {
        ChatDetailResponse {
            id: self.id.clone(),
            title: self.title.clone(),
            model: self.model.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
            messages: messages.iter().map(ChatMessage::to_response).collect(),
        }
    }
}

impl ChatMessage {
    pub fn to_response(&self) -> MessageResponse {
        MessageResponse {
            id: self.id.clone(),
            chat_id: self.chat_id.clone(),
            role: self.role.to_string(),
            content: self.content.clone(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
