use super::format::{paginate, FormatOptions, SymbolTable};
use super::models::CalendarEvent;
use super::source::EventSource;
use crate::components::DisplaySink;
use crate::config::CalendarSettings;
use crate::error::{calendar_error, AppResult};
use chrono::{DateTime, Duration, Local, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// One calendar integration: a set of widgets showing events from a set of calendars
#[derive(Debug, Clone)]
pub struct CalendarService {
    settings: CalendarSettings,
    options: FormatOptions,
    timezone: Option<Tz>,
}

impl CalendarService {
    /// Create a service rendering in `timezone`, or system local time when `None`
    pub fn new(settings: CalendarSettings, timezone: Option<Tz>) -> Self {
        let options = FormatOptions {
            symbols: SymbolTable::new(
                settings.calendar_names.clone(),
                &settings.calendar_symbols,
            ),
            max_title_len: settings.max_event_length,
            two_lines: settings.carriage_returns,
            day_separators: settings.day_separators,
        };

        Self {
            settings,
            options,
            timezone,
        }
    }

    pub fn settings(&self) -> &CalendarSettings {
        &self.settings
    }

    /// Text for every widget, in widget order
    pub fn render(&self, events: &[CalendarEvent], now: DateTime<Utc>) -> Vec<String> {
        let slot_count = self.settings.uuids.len();
        match self.timezone {
            Some(tz) => paginate(events, slot_count, &self.options, &now.with_timezone(&tz)),
            None => paginate(events, slot_count, &self.options, &now.with_timezone(&Local)),
        }
    }

    /// Fetch a fresh snapshot and push one update per widget
    pub async fn refresh(
        &self,
        source: &dyn EventSource,
        sink: &dyn DisplaySink,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let window_end = now
            .checked_add_signed(Duration::hours(i64::from(self.settings.lookahead_hours)))
            .ok_or_else(|| {
                calendar_error(&format!(
                    "Lookahead of {} hours is out of range",
                    self.settings.lookahead_hours
                ))
            })?;
        let events = source
            .fetch_events(&self.settings.calendar_names, now, window_end)
            .await?;

        let slots = self.render(&events, now);
        debug!(
            "Rendering {} events into {} widgets",
            events.len(),
            slots.len()
        );

        for (uuid, text) in self.settings.uuids.iter().zip(&slots) {
            sink.update_widget(uuid, text, None);
        }

        Ok(())
    }
}
