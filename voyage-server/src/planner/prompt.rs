//! Prompt construction for itinerary generation and revision.
//!
//! Both builders are pure. The model is asked to answer in two parts split by
//! [`DELIMITER`]; see [`super::reply`] for the parsing side.

use std::fmt::Write;

use crate::entities::{ChatMessage, ChatRole};
use crate::planner::reply::DELIMITER;

/// Shown to the model in place of an itinerary that has not been generated.
pub const EMPTY_ITINERARY_PLACEHOLDER: &str = "(no itinerary yet)";

/// Trip metadata embedded in follow-up prompts.
#[derive(Debug, Clone, Default)]
pub struct TripMeta<'a> {
    pub title: &'a str,
    pub destination: &'a str,
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub preferences: &'a str,
}

fn format_instructions(start_date: &str, end_date: &str) -> String {
    format!(
        "Answer in exactly two parts separated by a line containing only {DELIMITER}.\n\
         Part 1: a short, friendly message to the traveller (one to three sentences).\n\
         Part 2: the complete day-by-day itinerary from {start_date} to {end_date}, \
         using this format for every day:\n\
         - Day 1 (DATE):\n  \
           - Morning: ...\n  \
           - Afternoon: ...\n  \
           - Evening: ...\n\
         Do not write {DELIMITER} anywhere else in your answer."
    )
}

pub fn build_initial_prompt(
    destination: &str,
    start_date: &str,
    end_date: &str,
    preferences: &str,
) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are a travel planner. Create a trip to {destination} from {start_date} to {end_date}."
    );
    let _ = writeln!(prompt, "Traveller preferences: {preferences}");
    prompt.push('\n');
    prompt.push_str(&format_instructions(start_date, end_date));
    prompt
}

/// Prompt for one chat turn. The endpoint is stateless, so the full history
/// and the current itinerary travel with every request.
pub fn build_chat_prompt(
    current_itinerary: &str,
    history: &[ChatMessage],
    user_message: &str,
    meta: &TripMeta<'_>,
) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are a travel planner helping a traveller refine an existing itinerary."
    );
    let _ = writeln!(
        prompt,
        "Trip: {} ({}) from {} to {}.",
        meta.title, meta.destination, meta.start_date, meta.end_date
    );
    let _ = writeln!(prompt, "Traveller preferences: {}", meta.preferences);

    prompt.push_str("\nCurrent itinerary:\n");
    let current = current_itinerary.trim();
    if current.is_empty() {
        prompt.push_str(EMPTY_ITINERARY_PLACEHOLDER);
    } else {
        prompt.push_str(current);
    }
    prompt.push('\n');

    if !history.is_empty() {
        prompt.push_str("\nConversation so far:\n");
        for msg in history {
            let _ = writeln!(prompt, "{}: {}", speaker(msg.role), msg.content);
        }
    }

    let _ = writeln!(prompt, "\nUser: {user_message}");
    prompt.push('\n');
    let _ = writeln!(
        prompt,
        "Apply the request to the itinerary. If nothing needs to change, repeat the \
         current itinerary unchanged in part 2."
    );
    prompt.push_str(&format_instructions(meta.start_date, meta.end_date));
    prompt
}

fn speaker(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "User",
        ChatRole::Assistant => "Assistant",
    }
}
