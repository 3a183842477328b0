//! Provider selection and the streaming client adapter.
//!
//! [`Provider`] maps a model identifier to one of the known LLM backends;
//! [`LlmClient`] exposes a single `stream` capability over all of them.

pub mod client;
pub mod provider;

pub use client::{LlmClient, LlmError, TokenStream};
pub use provider::{HostedModel, Provider, hosted_models};
