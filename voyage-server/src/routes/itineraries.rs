//! Itinerary routes.
//!
//! Handlers receive the caller as an [`AuthUser`] extension and delegate to
//! [`crate::planner::ItineraryService`].

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router, middleware};
use utoipa::OpenApi;

use crate::auth::AuthUser;
use crate::error::ServerError;
use crate::middleware::auth;
use crate::schemas::itinerary::{
    ChatMessageResponse, ChatRequest, ChatResponse, CreateItineraryRequest,
    CreateItineraryResponse, ItineraryDaysResponse, ItineraryResponse, ItineraryStateResponse,
    ItinerarySummary, MessageResponse, RenameRequest,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_itinerary,
        list_itineraries,
        list_chats,
        get_state,
        get_days,
        chat,
        rename_itinerary,
        delete_itinerary
    ),
    components(schemas(
        CreateItineraryRequest,
        CreateItineraryResponse,
        ItineraryResponse,
        ItinerarySummary,
        ItineraryStateResponse,
        ItineraryDaysResponse,
        ChatRequest,
        ChatResponse,
        ChatMessageResponse,
        RenameRequest,
        MessageResponse
    ))
)]
pub struct ItinerariesApi;

/// Register itinerary routes, all behind [`auth::require_user`].
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/itineraries", post(create_itinerary).get(list_itineraries))
        .route("/itineraries/{id}", delete(delete_itinerary))
        .route("/itineraries/{id}/chats", get(list_chats))
        .route("/itineraries/{id}/state", get(get_state))
        .route("/itineraries/{id}/days", get(get_days))
        .route("/itineraries/{id}/chat", post(chat))
        .route("/itineraries/{id}/rename", put(rename_itinerary))
        .route_layer(middleware::from_fn_with_state(state, auth::require_user))
}

/// Create an itinerary and generate its first plan.
#[utoipa::path(
    post,
    path = "/itineraries",
    tag = "itineraries",
    request_body = CreateItineraryRequest,
    responses(
        (status = 200, description = "Itinerary created", body = CreateItineraryResponse),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Model or storage failure"),
    )
)]
pub async fn create_itinerary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateItineraryRequest>,
) -> Result<Json<CreateItineraryResponse>, ServerError> {
    let created = state.itineraries.create(&user, req).await?;
    Ok(Json(CreateItineraryResponse {
        itinerary: created.itinerary.to_response(),
        combined_message: created.combined_message,
    }))
}

#[utoipa::path(
    get,
    path = "/itineraries",
    tag = "itineraries",
    responses(
        (status = 200, description = "Itineraries, most recently updated first", body = Vec<ItinerarySummary>),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn list_itineraries(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ItinerarySummary>>, ServerError> {
    let rows = state.itineraries.list(&user).await?;
    Ok(Json(rows.iter().map(|i| i.to_summary()).collect()))
}

#[utoipa::path(
    get,
    path = "/itineraries/{id}/chats",
    tag = "itineraries",
    params(("id" = String, Path, description = "Itinerary id")),
    responses(
        (status = 200, description = "Chat history in creation order", body = Vec<ChatMessageResponse>),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChatMessageResponse>>, ServerError> {
    let messages = state.itineraries.history(&user, &id).await?;
    Ok(Json(messages.iter().map(|m| m.to_response()).collect()))
}

#[utoipa::path(
    get,
    path = "/itineraries/{id}/state",
    tag = "itineraries",
    params(("id" = String, Path, description = "Itinerary id")),
    responses(
        (status = 200, description = "Current itinerary text and metadata", body = ItineraryStateResponse),
        (status = 404, description = "Itinerary not found"),
    )
)]
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ItineraryStateResponse>, ServerError> {
    let itinerary = state.itineraries.state(&user, &id).await?;
    Ok(Json(itinerary.to_state()))
}

#[utoipa::path(
    get,
    path = "/itineraries/{id}/days",
    tag = "itineraries",
    params(("id" = String, Path, description = "Itinerary id")),
    responses(
        (status = 200, description = "Itinerary split into per-day blocks", body = ItineraryDaysResponse),
        (status = 404, description = "Itinerary not found"),
    )
)]
pub async fn get_days(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ItineraryDaysResponse>, ServerError> {
    let days = state.itineraries.days(&user, &id).await?;
    Ok(Json(ItineraryDaysResponse { days }))
}

/// One chat turn: revise the itinerary from a user message.
#[utoipa::path(
    post,
    path = "/itineraries/{id}/chat",
    tag = "itineraries",
    params(("id" = String, Path, description = "Itinerary id")),
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply and current itinerary", body = ChatResponse),
        (status = 400, description = "Empty message"),
        (status = 404, description = "Itinerary not found"),
        (status = 500, description = "Model or storage failure"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    let combined_message = state.itineraries.chat(&user, &id, &req.message).await?;
    Ok(Json(ChatResponse { combined_message }))
}

#[utoipa::path(
    put,
    path = "/itineraries/{id}/rename",
    tag = "itineraries",
    params(("id" = String, Path, description = "Itinerary id")),
    request_body = RenameRequest,
    responses(
        (status = 200, description = "Itinerary renamed", body = MessageResponse),
        (status = 400, description = "Empty title"),
        (status = 404, description = "Itinerary not found"),
    )
)]
pub async fn rename_itinerary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.itineraries.rename(&user, &id, &req.new_title).await?;
    Ok(Json(MessageResponse {
        message: "Itinerary renamed".into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/itineraries/{id}",
    tag = "itineraries",
    params(("id" = String, Path, description = "Itinerary id")),
    responses(
        (status = 200, description = "Itinerary and its chat history deleted", body = MessageResponse),
        (status = 404, description = "Itinerary not found"),
    )
)]
pub async fn delete_itinerary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.itineraries.delete(&user, &id).await?;
    Ok(Json(MessageResponse {
        message: "Itinerary deleted".into(),
    }))
}
