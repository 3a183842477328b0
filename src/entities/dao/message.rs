use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

/// Author of a message. Messages are immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A row in the `messages` table.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub chat_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
