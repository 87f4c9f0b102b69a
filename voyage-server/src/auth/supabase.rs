//! Supabase (GoTrue) token verification.
//!
//! `GET {base}/auth/v1/user` with the caller's token returns the user record
//! for a live session and 401/403 otherwise.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{AuthError, AuthProvider, AuthUser};

#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl SupabaseAuth {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let mut builder = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .bearer_auth(token);
        if let Some(key) = &self.api_key {
            builder = builder.header("apikey", key);
        }

        let res = builder.send().await?;
        let status = res.status();
        match status.as_u16() {
            200..=299 => {}
            400 | 401 | 403 | 404 => {
                debug!(status = status.as_u16(), "token rejected by auth provider");
                return Err(AuthError::InvalidToken);
            }
            _ => {
                let body = res.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), body = %body, "auth provider failure");
                return Err(AuthError::Provider(format!("status {status}")));
            }
        }

        let user: UserRecord = res
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("decoding user record: {e}")))?;
        if user.id.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }
}
