use super::models::CalendarEvent;
use crate::error::AppResult;
use crate::utils::subscription::Subscription;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Whether the process may read calendar events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Authorized,
    Denied,
}

/// Where calendar events come from
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Check, and if needed request, access to the calendar store
    async fn authorization(&self) -> AppResult<Authorization>;

    /// Events from the named calendars overlapping `[start, end)`, ordered by start time
    async fn fetch_events(
        &self,
        calendars: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>>;

    /// Notified at most once per burst of changes to the underlying store
    fn on_store_changed(&self) -> Subscription<()>;
}
