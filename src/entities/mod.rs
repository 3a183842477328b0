//! Database abstraction layer.
//!
//! [`ChatStore`] and [`SettingsStore`] define the persistence interface; the
//! default implementation is [`SqliteStore`]. To swap to another database,
//! implement both traits for your new type and change the concrete type in
//! [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.

pub mod chat;
pub mod dao;
pub mod settings;

pub use chat::{ChatStore, Exchange, ExchangeTarget};
pub use dao::{Chat, ChatMessage, MessageRole, SettingsRecord};
pub use settings::{SettingsPatch, SettingsStore};

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// SQLite-backed store for chats, messages, and settings.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending
    /// migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://skiff.db?mode=rwc"` or `"sqlite::memory:"` for tests.
    /// The migrations path is resolved relative to `CARGO_MANIFEST_DIR` at
    /// compile time, so the directory is embedded into the binary.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect(url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

/// Parse an RFC3339 timestamp stored as TEXT, falling back to now.
fn parse_datetime(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(raw, error = %e, "failed to parse stored timestamp; using now");
        Utc::now()
    })
}
