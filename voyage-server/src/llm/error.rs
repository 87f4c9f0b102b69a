//! Model gateway error types

use thiserror::Error;

/// Errors raised while talking to the language model endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("model gateway is not configured: {0}")]
    NotConfigured(String),
}
