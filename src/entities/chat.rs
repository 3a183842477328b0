//! Chat and message persistence.
//!
//! Reads use runtime-verified `sqlx::query_as` with tuple rows; timestamps
//! are stored as RFC3339 TEXT. Mutations that must land together (cascade
//! delete, the end-of-stream exchange) run inside a single transaction.

use std::future::Future;

use chrono::{DateTime, Utc};

use super::dao::{Chat, ChatMessage, MessageRole};
use super::{SqliteStore, parse_datetime};

/// Chat target of a completed streaming exchange.
#[derive(Debug, Clone)]
pub enum ExchangeTarget {
    /// The chat did not exist before the stream; insert this row.
    New(Chat),
    /// The chat existed; refresh its `updated_at`.
    Existing {
        id: String,
        updated_at: DateTime<Utc>,
    },
}

/// One completed user/assistant round trip, persisted atomically.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub target: ExchangeTarget,
    pub user: ChatMessage,
    pub assistant: ChatMessage,
}

pub trait ChatStore: Send + Sync + 'static {
    fn list_chats(&self) -> impl Future<Output = Result<Vec<Chat>, sqlx::Error>> + Send;
    fn create_chat(&self, chat: Chat) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_chat(&self, id: &str)
    -> impl Future<Output = Result<Option<Chat>, sqlx::Error>> + Send;
    /// Returns `false` when no chat with `id` exists.
    fn rename_chat(
        &self,
        id: &str,
        title: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
    /// Deletes the chat and all of its messages. Returns `false` when no
    /// chat with `id` exists.
    fn delete_chat(&self, id: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
    fn list_messages(
        &self,
        chat_id: &str,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;
    /// Persist a completed exchange: the chat mutation and both messages
    /// land in one transaction, or none do.
    fn record_exchange(
        &self,
        exchange: Exchange,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

impl ChatStore for SqliteStore {
    async fn list_chats(&self) -> Result<Vec<Chat>, sqlx::Error> {
        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
            "SELECT id, title, model, created_at, updated_at \
             FROM chats ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(chat_from_row).collect())
    }

    async fn create_chat(&self, chat: Chat) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO chats (id, title, model, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&chat.id)
        .bind(&chat.title)
        .bind(&chat.model)
        .bind(chat.created_at.to_rfc3339())
        .bind(chat.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_chat(&self, id: &str) -> Result<Option<Chat>, sqlx::Error> {
        let row: Option<(String, String, String, String, String)> = sqlx::query_as(
            "SELECT id, title, model, created_at, updated_at FROM chats WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(chat_from_row))
    }

    async fn rename_chat(&self, id: &str, title: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE chats SET title = ?1 WHERE id = ?2")
            .bind(title)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_chat(&self, id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM messages WHERE chat_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM chats WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, sqlx::Error> {
        // rowid breaks ties: a user/assistant pair from one exchange may
        // share a timestamp.
        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
            "SELECT id, chat_id, role, content, created_at \
             FROM messages WHERE chat_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(message_from_row).collect())
    }

    async fn record_exchange(&self, exchange: Exchange) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        match &exchange.target {
            ExchangeTarget::New(chat) => {
                sqlx::query(
                    "INSERT INTO chats (id, title, model, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .bind(&chat.id)
                .bind(&chat.title)
                .bind(&chat.model)
                .bind(chat.created_at.to_rfc3339())
                .bind(chat.updated_at.to_rfc3339())
                .execute(&mut *tx)
                .await?;
            }
            ExchangeTarget::Existing { id, updated_at } => {
                sqlx::query("UPDATE chats SET updated_at = ?1 WHERE id = ?2")
                    .bind(updated_at.to_rfc3339())
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
        }
        insert_message(&mut tx, &exchange.user).await?;
        insert_message(&mut tx, &exchange.assistant).await?;
        tx.commit().await?;
        Ok(())
    }
}

async fn insert_message(
    conn: &mut sqlx::SqliteConnection,
    msg: &ChatMessage,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO messages (id, chat_id, role, content, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&msg.id)
    .bind(&msg.chat_id)
    .bind(msg.role.to_string())
    .bind(&msg.content)
    .bind(msg.created_at.to_rfc3339())
    .execute(conn)
    .await?;
    Ok(())
}

fn chat_from_row(
    (id, title, model, created_at, updated_at): (String, String, String, String, String),
) -> Chat {
    Chat {
        id,
        title,
        model,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    }
}

fn message_from_row(
    (id, chat_id, role, content, created_at): (String, String, String, String, String),
) -> ChatMessage {
    let role = role.parse().unwrap_or_else(|_| {
        tracing::warn!(raw = %role, "unknown message role in store; treating as user");
        MessageRole::User
    });
    ChatMessage {
        id,
        chat_id,
        role,
        content,
        created_at: parse_datetime(&created_at),
    }
}
