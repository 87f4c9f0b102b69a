//! Unified server error type.
//!
//! Every handler and [`crate::planner::ItineraryService`] operation returns
//! `Result<T, ServerError>`, which implements [`axum::response::IntoResponse`]
//! so errors become a JSON `{"error": ...}` body with the matching status.
//!
//! Upstream and storage failures are logged in full but only a generic
//! message reaches the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or malformed input fields.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or rejected caller token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The itinerary does not exist or belongs to another user.
    #[error("not found: {0}")]
    NotFound(String),

    /// The model endpoint or auth provider failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Upstream(_) | ServerError::Database(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let client_message = match &self {
            ServerError::Validation(m) | ServerError::Unauthorized(m) | ServerError::NotFound(m) => {
                m.clone()
            }
            ServerError::Upstream(m) => {
                error!(message = %m, "upstream service error");
                "failed to reach an upstream service".to_owned()
            }
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                "internal server error".to_owned()
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                "internal server error".to_owned()
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<LlmError> for ServerError {
    fn from(e: LlmError) -> Self {
        ServerError::Upstream(e.to_string())
    }
}

impl From<AuthError> for ServerError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken | AuthError::InvalidToken => {
                ServerError::Unauthorized(e.to_string())
            }
            AuthError::Provider(_) | AuthError::Network(_) => ServerError::Upstream(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ServerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let detail = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_owned());
                format!("{field} {detail}")
            })
            .collect();
        fields.sort();
        ServerError::Validation(fields.join("; "))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: ServerError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_expose_message() {
        let (status, body) = body_of(ServerError::Validation("destination is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "destination is required");

        let (status, _) = body_of(ServerError::NotFound("itinerary not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upstream_errors_are_masked() {
        let err: ServerError = LlmError::Api {
            status: 500,
            message: "secret stack trace".into(),
        }
        .into();
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("secret"));
    }

    #[test]
    fn auth_errors_map_by_kind() {
        assert_eq!(
            ServerError::from(AuthError::InvalidToken).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServerError::from(AuthError::Provider("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
