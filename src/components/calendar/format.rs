//! Turns a snapshot of upcoming events into one line of text per touch bar slot.

use super::models::CalendarEvent;
use super::time::{clock_str, local_day, relative_day, weekday_str, RelativeDay};
use crate::utils::time::{duration_str, minutes_str, whole_minutes};
use chrono::{DateTime, TimeZone};
use unicode_segmentation::UnicodeSegmentation;

/// Shown in the first slot when there is nothing to display
pub const NO_EVENTS: &str = "No calendar events";
/// Occupies a slot whenever the list moves on to a later day
pub const DAY_SEPARATOR: &str = "●";

/// Positional mapping from calendar title to a display glyph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    names: Vec<String>,
    symbols: Vec<String>,
}

impl SymbolTable {
    /// The Nth name maps to the Nth user-perceived character of `symbols`
    pub fn new(names: Vec<String>, symbols: &str) -> Self {
        Self {
            names,
            symbols: symbols.graphemes(true).map(str::to_string).collect(),
        }
    }

    /// Glyph followed by a space, or an empty string when the calendar has none
    pub fn symbol_for(&self, calendar: &str) -> String {
        self.names
            .iter()
            .position(|name| name == calendar)
            .and_then(|index| self.symbols.get(index))
            .map(|symbol| format!("{} ", symbol))
            .unwrap_or_default()
    }
}

/// Rendering options for one calendar integration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatOptions {
    pub symbols: SymbolTable,
    /// Longest title shown before truncating, 0 for no limit
    pub max_title_len: usize,
    /// Put the time on a second line instead of after a space
    pub two_lines: bool,
    pub day_separators: bool,
}

/// Produce exactly `slot_count` strings from `events`, which must be ordered by start time.
///
/// Each slot shows the next unshown event. When day separators are enabled and the next event
/// starts on a later day than the one currently displayed, the slot shows [`DAY_SEPARATOR`]
/// instead and the event moves to the following slot. Slots left over after the last event are
/// blank, except the first which reads [`NO_EVENTS`].
pub fn paginate<Tz: TimeZone>(
    events: &[CalendarEvent],
    slot_count: usize,
    options: &FormatOptions,
    now: &DateTime<Tz>,
) -> Vec<String>
where
    Tz::Offset: std::fmt::Display,
{
    let mut slots = Vec::with_capacity(slot_count);
    let mut remaining = events.iter().peekable();
    let mut day_cursor = now.date_naive();

    for slot in 0..slot_count {
        let Some(event) = remaining.peek() else {
            slots.push(if slot == 0 { NO_EVENTS } else { "" }.to_string());
            continue;
        };

        if options.day_separators {
            if let Some(day) = event.start.map(|start| local_day(&start, now)) {
                if day > day_cursor {
                    day_cursor = day;
                    slots.push(DAY_SEPARATOR.to_string());
                    continue;
                }
            }
        }

        slots.push(format!(
            "{}{}",
            options.symbols.symbol_for(&event.calendar),
            render_event(event, options.max_title_len, options.two_lines, now)
        ));
        remaining.next();
    }

    slots
}

/// Title followed by a short description of when the event happens relative to `now`
pub fn render_event<Tz: TimeZone>(
    event: &CalendarEvent,
    max_title_len: usize,
    two_lines: bool,
    now: &DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut text = truncate_title(&event.title, max_title_len);
    text.push_str(if two_lines { "\n" } else { " " });
    text.push_str(&describe_timing(event, now));
    text
}

/// Cut `title` to `max_len` user-perceived characters and mark the cut with an ellipsis
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if max_len == 0 {
        return title.to_string();
    }

    match title.grapheme_indices(true).nth(max_len) {
        Some((cut, _)) => format!("{}...", &title[..cut]),
        None => title.to_string(),
    }
}

fn describe_timing<Tz: TimeZone>(event: &CalendarEvent, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(start) = event.start else {
        return "<no start date>".to_string();
    };
    let zone = now.timezone();
    let start = start.with_timezone(&zone);
    let until_start = start.clone() - now.clone();

    // Already under way
    if whole_minutes(until_start) < 0 {
        if event.all_day {
            return "today".to_string();
        }
        return match event.end.map(|end| end.with_timezone(&zone)) {
            Some(end) if end > *now => format!("ending in {}", duration_str(end - now.clone())),
            Some(_) => "ended.".to_string(),
            None => "<no end date>".to_string(),
        };
    }

    match relative_day(&start, now) {
        RelativeDay::Today if event.all_day => "today".to_string(),
        RelativeDay::Today if whole_minutes(until_start) < 60 => {
            format!("in {}", minutes_str(until_start))
        }
        RelativeDay::Today => format!("at {}", clock_str(&start)),
        RelativeDay::Tomorrow if event.all_day => "tmrw".to_string(),
        RelativeDay::Tomorrow => format!("{} tmrw", clock_str(&start)),
        RelativeDay::Later if event.all_day => weekday_str(&start),
        RelativeDay::Later => format!("{} {}", clock_str(&start), weekday_str(&start)),
    }
}
