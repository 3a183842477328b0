//! Model-to-provider resolution.
//!
//! The provider set is closed: every model identifier resolves to exactly one
//! tag, and anything not in the hosted catalog falls back to the local Ollama
//! daemon, which needs no credential.

use strum::{Display, EnumString};

/// An LLM backend the server can relay to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    Ollama,
    OpenAi,
    Anthropic,
    Google,
    Groq,
}

impl Provider {
    /// Resolve the provider for a model identifier.
    ///
    /// Known hosted models map to their vendor; everything else is assumed to
    /// be a locally pulled Ollama model.
    pub fn for_model(model: &str) -> Self {
        HOSTED_MODELS
            .iter()
            .find(|m| m.id == model)
            .map(|m| m.provider)
            .unwrap_or(Provider::Ollama)
    }

    /// Hosted providers need an API key; the local daemon does not.
    pub fn requires_credential(self) -> bool {
        !matches!(self, Provider::Ollama)
    }

    /// The hosted providers, in catalog order.
    pub const HOSTED: [Provider; 4] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Google,
        Provider::Groq,
    ];
}

/// A statically known hosted model.
#[derive(Debug, Clone, Copy)]
pub struct HostedModel {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: Provider,
}

const fn hosted(id: &'static str, name: &'static str, provider: Provider) -> HostedModel {
    HostedModel { id, name, provider }
}

/// Models offered for each hosted provider once its API key is configured.
pub const HOSTED_MODELS: &[HostedModel] = &[
    // OpenAI
    hosted("gpt-4o", "GPT-4o", Provider::OpenAi),
    hosted("gpt-4o-mini", "GPT-4o Mini", Provider::OpenAi),
    hosted("gpt-4-turbo", "GPT-4 Turbo", Provider::OpenAi),
    hosted("gpt-3.5-turbo", "GPT-3.5 Turbo", Provider::OpenAi),
    // Anthropic
    hosted("claude-sonnet-4-20250514", "Claude Sonnet 4", Provider::Anthropic),
    hosted("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet", Provider::Anthropic),
    hosted("claude-3-5-haiku-20241022", "Claude 3.5 Haiku", Provider::Anthropic),
    hosted("claude-3-opus-20240229", "Claude 3 Opus", Provider::Anthropic),
    // Google
    hosted("gemini-2.5-flash-lite", "Gemini 2.5 Flash Lite", Provider::Google),
    hosted("gemini-2.0-flash", "Gemini 2.0 Flash", Provider::Google),
    hosted("gemini-1.5-pro", "Gemini 1.5 Pro", Provider::Google),
    hosted("gemini-1.5-flash", "Gemini 1.5 Flash", Provider::Google),
    // Groq
    hosted("llama-3.3-70b-versatile", "Llama 3.3 70B", Provider::Groq),
    hosted("llama-3.1-8b-instant", "Llama 3.1 8B", Provider::Groq),
    hosted("mixtral-8x7b-32768", "Mixtral 8x7B", Provider::Groq),
    hosted("gemma2-9b-it", "Gemma 2 9B", Provider::Groq),
];

/// Catalog entries for a single hosted provider.
pub fn hosted_models(provider: Provider) -> impl Iterator<Item = &'static HostedModel> {
    HOSTED_MODELS.iter().filter(move |m| m.provider == provider)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
