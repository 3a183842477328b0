use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{SettingsPatch, SettingsRecord};
use crate::llm::Provider;

/// Body of `PATCH /api/settings`.
///
/// Absent fields are left untouched; an explicit empty string clears the
/// credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SettingsUpdate {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub default_model: Option<String>,
}

impl From<SettingsUpdate> for SettingsPatch {
    fn from(update: SettingsUpdate) -> Self {
        SettingsPatch {
            openai_api_key: update.openai_api_key,
            anthropic_api_key: update.anthropic_api_key,
            google_api_key: update.google_api_key,
            groq_api_key: update.groq_api_key,
            default_model: update.default_model,
        }
    }
}

/// Masked view of the settings row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingsResponse {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub default_model: String,
    pub openai_enabled: bool,
    pub anthropic_enabled: bool,
    pub google_enabled: bool,
    pub groq_enabled: bool,
}

/// Mask an API key for display: first 8 and last 4 characters visible,
/// fully masked when the key is 12 characters or shorter.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

impl SettingsRecord {
    pub fn to_response(&self) -> SettingsResponse {
        SettingsResponse {
            openai_api_key: self.openai_api_key.as_deref().map(mask_api_key),
            anthropic_api_key: self.anthropic_api_key.as_deref().map(mask_api_key),
            google_api_key: self.google_api_key.as_deref().map(mask_api_key),
            groq_api_key: self.groq_api_key.as_deref().map(mask_api_key),
            default_model: self
                .default_model
                .clone()
                .unwrap_or_else(|| super::DEFAULT_MODEL.to_owned()),
            openai_enabled: self.credential_for(Provider::OpenAi).is_some(),
            anthropic_enabled: self.credential_for(Provider::Anthropic).is_some(),
            google_enabled: self.credential_for(Provider::Google).is_some(),
            groq_enabled: self.credential_for(Provider::Groq).is_some(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_keys_are_fully_masked() {
        assert_eq!(mask_api_key("abc"), "***");
        assert_eq!(mask_api_key("123456789012"), "************");
    }

    #[test]
    fn long_keys_keep_head_and_tail() {
        assert_eq!(mask_api_key("sk-abcdefghijklmnop"), "sk-abcde...mnop");
    }

    #[test]
    fn empty_key_masks_to_empty() {
        assert_eq!(mask_api_key(""), "");
    }

    #[test]
    fn response_reports_enabled_flags() {
        let record = SettingsRecord {
            openai_api_key: Some("sk-abcdefghijklmnop".into()),
            ..Default::default()
        };
        let response = record.to_response();
        assert!(response.openai_enabled);
        assert!(!response.anthropic_enabled);
        assert_eq!(response.openai_api_key.as_deref(), Some("sk-abcde...mnop"));
        assert_eq!(response.default_model, "gemma3:1b");
    }
}
