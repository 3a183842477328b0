//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for skiff-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite (or other) database URL (default: `"sqlite://skiff.db?mode=rwc"`).
    /// Supports any sqlx-compatible connection string.
    pub database_url: String,

    /// Base URL of the local Ollama daemon, used for model discovery
    /// (default: `"http://localhost:11434"`).
    pub ollama_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Serve Swagger UI at `/swagger-ui` (default: `true`).
    /// Disable in production to avoid exposing the API structure.
    pub enable_swagger: bool,

    /// Comma-separated list of allowed CORS origins.
    /// Unset means wildcard, suitable for development only.
    pub cors_allowed_origins: Option<String>,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("SKIFF_BIND", "0.0.0.0:3000"),
            database_url: env_or("SKIFF_DATABASE_URL", "sqlite://skiff.db?mode=rwc"),
            ollama_url: env_or("SKIFF_OLLAMA_URL", "http://localhost:11434"),
            log_level: env_or("SKIFF_LOG", "info"),
            log_json: bool_env("SKIFF_LOG_JSON", false),
            enable_swagger: bool_env("SKIFF_ENABLE_SWAGGER", true),
            cors_allowed_origins: std::env::var("SKIFF_CORS_ORIGINS").ok(),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
