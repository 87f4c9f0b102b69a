//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::config::Config;
use crate::planner::ItineraryService;

/// Clients are built once in `main` and live for the whole process.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Resolves caller tokens to users.
    pub auth: Arc<dyn AuthProvider>,
    /// Itinerary orchestration over the store and the model gateway.
    pub itineraries: ItineraryService,
}
