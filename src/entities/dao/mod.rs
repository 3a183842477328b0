pub mod chat;
pub mod message;
pub mod settings;

pub use chat::Chat;
pub use message::{ChatMessage, MessageRole};
pub use settings::SettingsRecord;
