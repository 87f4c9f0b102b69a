use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::entities::{ChatMessage, ChatRole, Itinerary};

/// Request body for `POST /itineraries`.
///
/// Missing fields deserialize as empty strings so that validation, not JSON
/// decoding, reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItineraryRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "is required"))]
    pub destination: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "is required"))]
    pub start_date: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "is required"))]
    pub end_date: String,
    #[serde(default)]
    pub preferences: String,
}

/// Request body for `POST /itineraries/{id}/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Request body for `PUT /itineraries/{id}/rename`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    #[serde(default)]
    pub new_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItineraryResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub preferences: String,
    pub itinerary_text: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Response body for `POST /itineraries`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItineraryResponse {
    pub itinerary: ItineraryResponse,
    /// `<chat reply>||||<itinerary text>`.
    pub combined_message: String,
}

/// Response body for `POST /itineraries/{id}/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub combined_message: String,
}

/// One entry of `GET /itineraries`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItinerarySummary {
    pub id: String,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub updated_at: String,
}

/// Response body for `GET /itineraries/{id}/state`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItineraryStateResponse {
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub itinerary_text: String,
}

/// Response body for `GET /itineraries/{id}/days`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItineraryDaysResponse {
    pub days: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageResponse {
    pub id: String,
    pub itinerary_id: String,
    #[schema(value_type = String, example = "assistant")]
    pub role: ChatRole,
    pub content: String,
    pub created_at: String,
}

/// `{"message": ...}` acknowledgement for rename and delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

impl Itinerary {
    pub fn to_response(&self) -> ItineraryResponse {
        ItineraryResponse {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            title: self.title.clone(),
            destination: self.destination.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            preferences: self.preferences.clone(),
            itinerary_text: self.itinerary_text.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }

    pub fn to_summary(&self) -> ItinerarySummary {
        ItinerarySummary {
            id: self.id.clone(),
            title: self.title.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }

    pub fn to_state(&self) -> ItineraryStateResponse {
        ItineraryStateResponse {
            title: self.title.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            itinerary_text: self.itinerary_text.clone(),
        }
    }
}

impl ChatMessage {
    pub fn to_response(&self) -> ChatMessageResponse {
        ChatMessageResponse {
            id: self.id.clone(),
            itinerary_id: self.itinerary_id.clone(),
            role: self.role,
            content: self.content.clone(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
