//! Caller authentication for itinerary routes.
//!
//! The token is read from `Authorization: Bearer <token>`, or from a raw
//! `token` header as sent by the web client. On success the
//! resolved [`AuthUser`] is stored in the request extensions.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::auth::AuthUser;
use crate::error::ServerError;
use crate::state::AppState;

pub static TOKEN_HEADER: &str = "token";

pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let token = access_token(req.headers())
        .ok_or_else(|| ServerError::Unauthorized("missing access token".into()))?;

    let user: AuthUser = state.auth.verify(&token).await?;
    debug!(user_id = %user.id, "caller authenticated");
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

fn access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token);
    let raw = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok());

    bearer
        .or(raw)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}
