//! Uniform streaming interface over the heterogeneous provider backends.
//!
//! One [`genai`] client serves every provider: the model identifier selects
//! the wire adapter, and the credential resolved from settings is injected
//! through an [`AuthResolver`]. The adapter performs no buffering or
//! coalescing; fragments surface in emission order exactly as received.

use std::pin::Pin;

use futures::{Stream, StreamExt};
use genai::Client;
use genai::chat::{ChatMessage, ChatRequest, ChatStreamEvent};
use genai::resolver::{AuthData, AuthResolver};
use thiserror::Error;
use tracing::debug;

use super::Provider;

/// A finite, non-restartable sequence of text fragments.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Errors from adapter construction or the underlying provider SDK.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The tag names no known provider (a configuration error, distinct
    /// from a missing credential).
    #[error("unknown provider: {0}")]
    InvalidProvider(String),

    /// A credential-requiring provider was constructed without one.
    #[error("API key for {0} is not configured")]
    MissingCredential(Provider),

    #[error(transparent)]
    Provider(#[from] genai::Error),
}

/// Streaming client bound to one provider and (optionally) one credential.
#[derive(Debug)]
pub struct LlmClient {
    client: Client,
    provider: Provider,
}

impl LlmClient {
    /// Construct a client for `provider`.
    ///
    /// Fails fast with [`LlmError::MissingCredential`] when a hosted provider
    /// is given no API key; callers must reject the request before any
    /// stream is opened.
    pub fn new(provider: Provider, api_key: Option<String>) -> Result<Self, LlmError> {
        if provider.requires_credential() && api_key.is_none() {
            return Err(LlmError::MissingCredential(provider));
        }
        let client = match api_key {
            Some(key) => {
                let auth = AuthResolver::from_resolver_fn(
                    move |_: genai::ModelIden| -> Result<Option<AuthData>, genai::resolver::Error> {
                        Ok(Some(AuthData::from_single(key.clone())))
                    },
                );
                Client::builder().with_auth_resolver(auth).build()
            }
            None => Client::default(),
        };
        Ok(Self { client, provider })
    }

    /// Construct from a raw provider tag, e.g. from configuration.
    pub fn for_tag(tag: &str, api_key: Option<String>) -> Result<Self, LlmError> {
        let provider = tag
            .parse::<Provider>()
            .map_err(|_| LlmError::InvalidProvider(tag.to_owned()))?;
        Self::new(provider, api_key)
    }

    /// Open a token stream for a single user message against `model`.
    pub async fn stream(&self, message: &str, model: &str) -> Result<TokenStream, LlmError> {
        debug!(provider = %self.provider, model, "opening provider stream");
        let request = ChatRequest::new(vec![ChatMessage::user(message)]);
        let response = self.client.exec_chat_stream(model, request, None).await?;
        let fragments = response.stream.filter_map(|event| async move {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) if !chunk.content.is_empty() => {
                    Some(Ok(chunk.content))
                }
                Ok(_) => None,
                Err(e) => Some(Err(LlmError::from(e))),
            }
        });
        Ok(Box::pin(fragments))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
