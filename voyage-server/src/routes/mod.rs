//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional OpenAPI document (disable with `VOYAGE_ENABLE_DOCS=false`)
//! - Health / heartbeat route
//! - Authenticated `/itineraries` routes

pub mod doc;
mod health;
mod itineraries;

use axum::routing::get;
use axum::{Router, middleware};
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(itineraries::router(Arc::clone(&state)));

    if state.config.enable_docs {
        app = app.route("/api-docs/openapi.json", get(doc::openapi_json));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(Arc::clone(&state))))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
