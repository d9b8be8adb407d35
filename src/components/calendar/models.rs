use chrono::{DateTime, Utc};

/// Snapshot of one calendar event as reported by the event source
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,
    /// Title of the calendar the event belongs to
    #[serde(default)]
    pub calendar: String,
}

impl CalendarEvent {
    /// Timed event between `start` and `end`
    pub fn timed(
        title: impl Into<String>,
        calendar: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            start: Some(start),
            end: Some(end),
            all_day: false,
            calendar: calendar.into(),
        }
    }

    /// All-day event starting at `start`
    pub fn all_day(
        title: impl Into<String>,
        calendar: impl Into<String>,
        start: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            start: Some(start),
            end: Some(start + chrono::Duration::days(1)),
            all_day: true,
            calendar: calendar.into(),
        }
    }
}

/// Sort events by start time, events without a start last
pub fn sort_by_start(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| match (a.start, b.start) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
