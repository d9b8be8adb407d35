use super::models::{sort_by_start, CalendarEvent};
use super::recurrence::RecurrenceRule;
use super::source::{Authorization, EventSource};
use crate::error::{calendar_error, AppResult, Error};
use crate::utils::osascript::{self, Language};
use crate::utils::subscription::{Publisher, Subscription};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Touching Calendar's scripting interface triggers the Automation permission prompt
const AUTHORIZATION_SCRIPT: &str = "Application('Calendar').calendars.length;";

/// Recurring series are reported once, with their rule, and expanded on our side because
/// Calendar only matches the first occurrence against a date filter
const EVENTS_SCRIPT: &str = r#"
const app = Application('Calendar');
const wanted = __CALENDARS__;
const windowStart = new Date(__START__);
const windowEnd = new Date(__END__);
const out = [];
function collect(matching, name, recurring) {
    const titles = matching.summary();
    const starts = matching.startDate();
    const ends = matching.endDate();
    const allDay = matching.alldayEvent();
    const rules = matching.recurrence();
    let excluded = [];
    if (recurring) {
        try { excluded = matching.excludedDates(); } catch (e) { excluded = []; }
    }
    for (let i = 0; i < titles.length; i++) {
        const rule = rules[i] || null;
        if (!recurring && rule) continue;
        out.push({
            title: titles[i] || '',
            start: starts[i] ? starts[i].toISOString() : null,
            end: ends[i] ? ends[i].toISOString() : null,
            allDay: !!allDay[i],
            calendar: name,
            recurrence: recurring ? rule : null,
            excludedDates: (excluded[i] || []).map(d => d.toISOString())
        });
    }
}
app.calendars().forEach(cal => {
    const name = cal.name();
    if (!wanted.includes(name)) return;
    collect(cal.events.whose({_and: [
        {endDate: {_greaterThan: windowStart}},
        {startDate: {_lessThan: windowEnd}}
    ]}), name, false);
    collect(cal.events.whose({_and: [
        {startDate: {_lessThan: windowEnd}},
        {recurrence: {_contains: 'FREQ'}}
    ]}), name, true);
});
JSON.stringify(out);
"#;

/// Calendar store locations, newest macOS first, relative to the home directory
const STORE_CANDIDATES: &[&str] = &[
    "Library/Group Containers/group.com.apple.calendar",
    "Library/Calendars",
];

/// Reads events from Calendar.app through JavaScript for Automation and watches the
/// calendar store on disk for changes
pub struct CalendarAppSource {
    changes: Publisher<()>,
    _watcher: Option<Mutex<RecommendedWatcher>>,
}

impl CalendarAppSource {
    /// Create the source. Without a usable store path only the refresh timer triggers updates.
    pub fn new(store_path: Option<PathBuf>) -> Self {
        let changes = Publisher::new();

        let watcher = match store_path.or_else(default_store_path) {
            Some(path) => match watch_store(&path, changes.clone()) {
                Ok(watcher) => {
                    info!("Watching calendar store at {}", path.display());
                    Some(Mutex::new(watcher))
                }
                Err(e) => {
                    warn!("Cannot watch calendar store {}: {}", path.display(), e);
                    None
                }
            },
            None => {
                warn!("No calendar store found, relying on the refresh timer");
                None
            }
        };

        Self {
            changes,
            _watcher: watcher,
        }
    }
}

#[async_trait]
impl EventSource for CalendarAppSource {
    async fn authorization(&self) -> AppResult<Authorization> {
        match osascript::run(Language::JavaScript, AUTHORIZATION_SCRIPT).await {
            Ok(_) => Ok(Authorization::Authorized),
            Err(Error::NotAuthorized(_)) => Ok(Authorization::Denied),
            Err(e) => Err(e),
        }
    }

    async fn fetch_events(
        &self,
        calendars: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>> {
        let script = events_script(calendars, start, end)?;
        let output = osascript::run(Language::JavaScript, &script).await?;
        let events = parse_events(&output, calendars, start, end, &Local)?;
        debug!("Fetched {} calendar events", events.len());
        Ok(events)
    }

    fn on_store_changed(&self) -> Subscription<()> {
        self.changes.subscribe()
    }
}

/// Fill in the event query for the given calendars and window
pub fn events_script(
    calendars: &[String],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppResult<String> {
    Ok(EVENTS_SCRIPT
        .replace("__CALENDARS__", &serde_json::to_string(calendars)?)
        .replace("__START__", &start.timestamp_millis().to_string())
        .replace("__END__", &end.timestamp_millis().to_string()))
}

/// One record of the script output; recurring series carry their rule
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptEvent {
    #[serde(flatten)]
    event: CalendarEvent,
    #[serde(default)]
    recurrence: Option<String>,
    #[serde(default)]
    excluded_dates: Vec<DateTime<Utc>>,
}

/// Decode the script output, keeping only the wanted calendars, ordered by start time.
///
/// Recurring series are expanded into their occurrences between `start` and `end`, repeating
/// at the same wall-clock time in `zone`.
pub fn parse_events<Tz: TimeZone>(
    output: &str,
    calendars: &[String],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    zone: &Tz,
) -> AppResult<Vec<CalendarEvent>> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    let records: Vec<ScriptEvent> = serde_json::from_str(output)
        .map_err(|e| calendar_error(&format!("Failed to parse events: {}", e)))?;

    let mut events = Vec::new();
    for record in records {
        if !calendars.contains(&record.event.calendar) {
            continue;
        }
        let rule = record.recurrence.as_deref().filter(|rule| !rule.trim().is_empty());
        match (rule, record.event.start) {
            (Some(rule), Some(first)) => match rule.parse::<RecurrenceRule>() {
                Ok(rule) => events.extend(expand(&record, &rule, first, start, end, zone)),
                Err(e) => {
                    warn!(
                        "Showing only the first occurrence of {:?}: {}",
                        record.event.title, e
                    );
                    events.push(record.event);
                }
            },
            _ => events.push(record.event),
        }
    }
    sort_by_start(&mut events);

    Ok(events)
}

fn expand<Tz: TimeZone>(
    record: &ScriptEvent,
    rule: &RecurrenceRule,
    first: DateTime<Utc>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    zone: &Tz,
) -> Vec<CalendarEvent> {
    let length = match record.event.end {
        Some(end) => end - first,
        None if record.event.all_day => Duration::days(1),
        None => Duration::zero(),
    };

    rule.occurrences_in(
        &first.with_timezone(zone),
        length,
        window_start,
        window_end,
        &record.excluded_dates,
    )
    .into_iter()
    .map(|occurrence| CalendarEvent {
        start: Some(occurrence),
        end: occurrence.checked_add_signed(length),
        ..record.event.clone()
    })
    .collect()
}

fn default_store_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    STORE_CANDIDATES
        .iter()
        .map(|candidate| home.join(candidate))
        .find(|path| path.is_dir())
}

fn watch_store(path: &Path, changes: Publisher<()>) -> AppResult<RecommendedWatcher> {
    let mut watcher =
        notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
            Ok(event) if !event.kind.is_access() => {
                changes.publish(());
            }
            Ok(_) => {}
            Err(e) => warn!("Calendar store watch error: {}", e),
        })?;
    watcher.watch(path, RecursiveMode::Recursive)?;

    Ok(watcher)
}
