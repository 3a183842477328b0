//! Request / response types for the HTTP surface.

pub mod chat;
pub mod models;
pub mod settings;

/// Model used when a request or the settings row does not name one.
pub const DEFAULT_MODEL: &str = "gemma3:1b";
