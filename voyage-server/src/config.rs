//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

/// Runtime configuration for voyage-server.
///
/// Every field has a default so the server starts without any environment
/// variables set; model and auth calls will fail until their keys are given.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3001"`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://voyage.db"`).
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Directory for daily-rolling log files. `None` logs to stdout only.
    pub log_dir: Option<String>,

    /// Comma-separated list of allowed CORS origins. `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,

    /// Gemini REST base URL.
    pub gemini_endpoint: String,

    /// Gemini model name, with or without the `models/` prefix.
    pub gemini_model: String,

    /// Gemini API key (`GEMINI_API_KEY`).
    pub gemini_api_key: Option<String>,

    /// Per-request timeout for model calls. `None` keeps the client default.
    pub model_timeout: Option<Duration>,

    /// Base URL of the auth provider (Supabase project URL).
    pub auth_url: String,

    /// Public (anon) API key sent alongside token lookups.
    pub auth_api_key: Option<String>,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("VOYAGE_BIND", "0.0.0.0:3001"),
            database_url: env_or("VOYAGE_DATABASE_URL", "sqlite://voyage.db"),
            log_level: env_or("VOYAGE_LOG", "info"),
            log_json: parse_bool("VOYAGE_LOG_JSON", false),
            log_dir: env_opt("VOYAGE_LOG_DIR"),
            cors_allowed_origins: env_opt("VOYAGE_CORS_ORIGINS"),
            enable_docs: parse_bool("VOYAGE_ENABLE_DOCS", true),
            gemini_endpoint: env_or(
                "VOYAGE_GEMINI_ENDPOINT",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            gemini_model: env_or("VOYAGE_GEMINI_MODEL", "gemini-2.5-pro"),
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            model_timeout: env_opt("VOYAGE_MODEL_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            auth_url: env_or("VOYAGE_AUTH_URL", "http://localhost:54321"),
            auth_api_key: env_opt("VOYAGE_AUTH_API_KEY"),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
