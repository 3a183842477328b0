use crate::llm::Provider;

/// The singleton row in the `settings` table (always id 1).
#[derive(Debug, Clone, Default)]
pub struct SettingsRecord {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub default_model: Option<String>,
}

impl SettingsRecord {
    /// The stored credential for `provider`, if any.
    ///
    /// Ollama never has one; cleared fields count as absent.
    pub fn credential_for(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Ollama => None,
            Provider::OpenAi => self.openai_api_key.as_deref(),
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
            Provider::Google => self.google_api_key.as_deref(),
            Provider::Groq => self.groq_api_key.as_deref(),
        };
        key.filter(|k| !k.is_empty())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
