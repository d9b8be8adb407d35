use chrono::{DateTime, NaiveDate, TimeZone};

/// Where an event's start falls relative to the current day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Today,
    Tomorrow,
    Later,
}

/// Classify `start` against `now`, both in the display timezone
pub fn relative_day<Tz: TimeZone>(start: &DateTime<Tz>, now: &DateTime<Tz>) -> RelativeDay {
    let start_day = start.date_naive();
    let today = now.date_naive();

    if start_day <= today {
        RelativeDay::Today
    } else if today.succ_opt() == Some(start_day) {
        RelativeDay::Tomorrow
    } else {
        RelativeDay::Later
    }
}

/// Calendar day of `instant` in the timezone of `now`
pub fn local_day<Tz: TimeZone>(instant: &DateTime<chrono::Utc>, now: &DateTime<Tz>) -> NaiveDate {
    instant.with_timezone(&now.timezone()).date_naive()
}

/// 24 hour `HH:MM`
pub fn clock_str<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.format("%H:%M").to_string()
}

/// Three letter weekday, e.g. `Mon`
pub fn weekday_str<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.format("%a").to_string()
}
