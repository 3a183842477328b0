use chrono::{DateTime, Utc};

/// A row in the `chats` table.
///
/// `updated_at` never decreases; it is refreshed whenever a message is
/// appended to the conversation.
#[derive(Debug, Clone)]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
