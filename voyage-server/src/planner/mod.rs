//! Itinerary synthesis and chat reconciliation.
//!
//! [`prompt`] builds the model prompts, [`reply`] parses what comes back,
//! [`days`] segments stored text for display, and [`service`] ties them to
//! the store and the model gateway.

pub mod days;
pub mod prompt;
pub mod reply;
pub mod service;

pub use days::split_into_days;
pub use reply::{DELIMITER, SplitReply, combine, split_reply};
pub use service::{CreatedItinerary, ItineraryService};
