//! Caller identity.
//!
//! Token issuance lives with a third-party auth service; this layer only
//! resolves a bearer token to the user it was issued for.

pub mod supabase;

pub use supabase::SupabaseAuth;

use async_trait::async_trait;
use thiserror::Error;

/// The authenticated caller, inserted into request extensions by
/// [`crate::middleware::auth::require_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing access token")]
    MissingToken,

    #[error("invalid or expired access token")]
    InvalidToken,

    #[error("auth provider error: {0}")]
    Provider(String),

    #[error("auth provider unreachable: {0}")]
    Network(#[from] reqwest::Error),
}

#[async_trait]
pub trait AuthProvider: Send + Sync + std::fmt::Debug {
    /// Resolve `token` to the user it belongs to.
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}
