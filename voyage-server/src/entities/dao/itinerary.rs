use chrono::{DateTime, Utc};

/// A row in the `itineraries` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub id: String,
    /// Owner; every query is scoped by this column.
    pub user_id: String,
    pub title: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub preferences: String,
    /// Canonical day-by-day plan, replaced wholesale on each revision.
    pub itinerary_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
