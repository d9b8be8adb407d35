use chrono::TimeDelta;

/// Whole minutes in a duration, truncated toward zero
pub fn whole_minutes(duration: TimeDelta) -> i64 {
    duration.num_seconds() / 60
}

/// Format a duration as minutes, e.g. `1 min` or `25 mins`
pub fn minutes_str(duration: TimeDelta) -> String {
    let minutes = whole_minutes(duration);
    if minutes == 1 {
        "1 min".to_string()
    } else {
        format!("{} mins", minutes)
    }
}

/// Format a duration as hours with one decimal, e.g. `1.5 hrs`
pub fn hours_str(duration: TimeDelta) -> String {
    let hours = duration.num_seconds() as f64 / 3600.0;
    format!("{:.1} hrs", hours)
}

/// Minutes below an hour, hours with one decimal otherwise
pub fn duration_str(duration: TimeDelta) -> String {
    if whole_minutes(duration) < 60 {
        minutes_str(duration)
    } else {
        hours_str(duration)
    }
}
