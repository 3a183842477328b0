//! Provider-credential settings persistence.
//!
//! The settings row is a lazily created singleton. Updates are partial: an
//! absent field is left untouched, an explicit empty string clears the
//! credential.

use std::future::Future;

use super::SqliteStore;
use super::dao::SettingsRecord;

const SETTINGS_ID: i64 = 1;

/// Partial update of the settings row.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub default_model: Option<String>,
}

pub trait SettingsStore: Send + Sync + 'static {
    /// Read the settings row without creating it.
    fn get_settings(
        &self,
    ) -> impl Future<Output = Result<Option<SettingsRecord>, sqlx::Error>> + Send;
    /// Read the settings row, inserting the default row first if absent.
    fn fetch_or_create_settings(
        &self,
    ) -> impl Future<Output = Result<SettingsRecord, sqlx::Error>> + Send;
    /// Apply a partial update and return the resulting row.
    fn update_settings(
        &self,
        patch: SettingsPatch,
    ) -> impl Future<Output = Result<SettingsRecord, sqlx::Error>> + Send;
}

impl SettingsStore for SqliteStore {
    async fn get_settings(&self) -> Result<Option<SettingsRecord>, sqlx::Error> {
        type Row = (
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        );
        let row: Option<Row> = sqlx::query_as(
            "SELECT openai_api_key, anthropic_api_key, google_api_key, groq_api_key, \
             default_model FROM settings WHERE id = ?1",
        )
        .bind(SETTINGS_ID)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(
            |(openai_api_key, anthropic_api_key, google_api_key, groq_api_key, default_model)| {
                SettingsRecord {
                    openai_api_key,
                    anthropic_api_key,
                    google_api_key,
                    groq_api_key,
                    default_model,
                }
            },
        ))
    }

    async fn fetch_or_create_settings(&self) -> Result<SettingsRecord, sqlx::Error> {
        if let Some(settings) = self.get_settings().await? {
            return Ok(settings);
        }
        sqlx::query("INSERT INTO settings (id) VALUES (?1) ON CONFLICT(id) DO NOTHING")
            .bind(SETTINGS_ID)
            .execute(&self.pool)
            .await?;
        Ok(self.get_settings().await?.unwrap_or_default())
    }

    async fn update_settings(&self, patch: SettingsPatch) -> Result<SettingsRecord, sqlx::Error> {
        let mut settings = self.fetch_or_create_settings().await?;
        apply_credential(&mut settings.openai_api_key, patch.openai_api_key);
        apply_credential(&mut settings.anthropic_api_key, patch.anthropic_api_key);
        apply_credential(&mut settings.google_api_key, patch.google_api_key);
        apply_credential(&mut settings.groq_api_key, patch.groq_api_key);
        if let Some(model) = patch.default_model {
            settings.default_model = Some(model);
        }
        sqlx::query(
            "UPDATE settings SET openai_api_key = ?1, anthropic_api_key = ?2, \
             google_api_key = ?3, groq_api_key = ?4, default_model = ?5 WHERE id = ?6",
        )
        .bind(&settings.openai_api_key)
        .bind(&settings.anthropic_api_key)
        .bind(&settings.google_api_key)
        .bind(&settings.groq_api_key)
        .bind(&settings.default_model)
        .bind(SETTINGS_ID)
        .execute(&self.pool)
        .await?;
        Ok(settings)
    }
}

/// Absent leaves the field untouched; an empty string clears it.
fn apply_credential(field: &mut Option<String>, patch: Option<String>) {
    match patch {
        None => {}
        Some(value) if value.is_empty() => *field = None,
        Some(value) => *field = Some(value),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
