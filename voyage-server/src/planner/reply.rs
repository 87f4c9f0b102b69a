//! Splitting model replies into a chat message and an itinerary.
//!
//! The model is asked to emit `<chat reply>||||<itinerary>`. Nothing forces
//! it to comply, so the parser treats the reply as untrusted: a missing
//! delimiter yields an empty itinerary and callers keep the stored text.
//! The same delimiter joins the two halves in the `combinedMessage` sent to
//! clients. No escaping is done; an itinerary containing the delimiter would
//! split in the wrong place.

pub const DELIMITER: &str = "||||";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitReply {
    pub chat_reply: String,
    /// Empty when the reply carried no itinerary part.
    pub itinerary_text: String,
}

impl SplitReply {
    pub fn has_itinerary(&self) -> bool {
        !self.itinerary_text.is_empty()
    }
}

/// Split on the first [`DELIMITER`]; both halves are trimmed.
pub fn split_reply(reply: &str) -> SplitReply {
    match reply.split_once(DELIMITER) {
        Some((chat, itinerary)) => SplitReply {
            chat_reply: chat.trim().to_string(),
            itinerary_text: itinerary.trim().to_string(),
        },
        None => SplitReply {
            chat_reply: reply.trim().to_string(),
            itinerary_text: String::new(),
        },
    }
}

pub fn combine(chat_reply: &str, itinerary_text: &str) -> String {
    format!("{chat_reply}{DELIMITER}{itinerary_text}")
}
