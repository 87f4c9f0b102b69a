pub mod chat;
pub mod itinerary;

pub use chat::{ChatMessage, ChatRole};
pub use itinerary::Itinerary;
