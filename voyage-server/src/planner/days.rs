//! Per-day segmentation of itinerary text for display.

use std::sync::LazyLock;

use regex::Regex;

/// A line that opens a new day: optional indentation and bullet, then
/// `Day <n>`, any case.
static DAY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*[-–*•]?[ \t]*day[ \t]+\d+").expect("day header pattern is valid")
});

/// Lazy iterator over trimmed, non-empty day blocks. Clone it to restart.
#[derive(Debug, Clone)]
pub struct DaySegments<'a> {
    text: &'a str,
    cursor: usize,
}

pub fn split_into_days(text: &str) -> DaySegments<'_> {
    DaySegments { text, cursor: 0 }
}

impl<'a> Iterator for DaySegments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while self.cursor < self.text.len() {
            let start = self.cursor;
            let end = next_boundary(self.text, start);
            self.cursor = end;
            let segment = self.text[start..end].trim();
            if !segment.is_empty() {
                return Some(segment);
            }
        }
        None
    }
}

/// Start of the first day header strictly after `start`, or the end of text.
fn next_boundary(text: &str, start: usize) -> usize {
    let step = text[start..].chars().next().map_or(1, char::len_utf8);
    DAY_HEADER
        .find_at(text, start + step)
        .map_or(text.len(), |m| m.start())
}
