mod calendar_app;
pub mod format;
pub mod models;
mod scheduler;
mod service;
pub mod source;
mod recurrence;
mod time;

pub use calendar_app::{events_script, parse_events, CalendarAppSource};
pub use models::CalendarEvent;
pub use scheduler::CalendarScheduler;
pub use service::CalendarService;
pub use source::{Authorization, EventSource};

use super::DisplaySink;
use crate::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Progress of the calendar component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Starting,
    /// Calendar access has not been granted yet; nothing is shown until it is
    AwaitingAuthorization,
    Running,
    Stopped,
}

/// Calendar component driving every configured calendar integration
pub struct CalendarComponent {
    services: Mutex<Option<Vec<CalendarService>>>,
    source: Arc<dyn EventSource>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
    state: watch::Sender<ServiceState>,
}

impl CalendarComponent {
    /// Create the component for `services`, all reading from `source`
    pub fn new(services: Vec<CalendarService>, source: Arc<dyn EventSource>) -> Self {
        let (state, _) = watch::channel(ServiceState::Starting);
        Self {
            services: Mutex::new(Some(services)),
            source,
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
            state,
        }
    }

    /// Follow the component's progress, available before it is initialized
    pub fn watch_state(&self) -> watch::Receiver<ServiceState> {
        self.state.subscribe()
    }
}

/// Log the component's progress until it stops
pub async fn report_state(mut state: watch::Receiver<ServiceState>) {
    loop {
        match *state.borrow_and_update() {
            ServiceState::Starting => {}
            ServiceState::AwaitingAuthorization => {
                warn!("Calendar widgets stay empty until calendar access is granted")
            }
            ServiceState::Running => info!("Calendar widgets are live"),
            ServiceState::Stopped => return,
        }

        if state.changed().await.is_err() {
            return;
        }
    }
}

#[async_trait]
impl super::Component for CalendarComponent {
    fn name(&self) -> &'static str {
        "calendar"
    }

    async fn init(&self, sink: Arc<dyn DisplaySink>) -> AppResult<()> {
        let Some(services) = self.services.lock().await.take() else {
            warn!("Calendar component is already running, skipping initialization");
            return Ok(());
        };

        let scheduler = CalendarScheduler::with_state(
            services,
            Arc::clone(&self.source),
            sink,
            self.state.clone(),
        );

        // Start the refresh scheduler
        let cancel = self.cancel.clone();
        let task = tokio::spawn(async move {
            scheduler.run(cancel).await;
        });
        *self.task.lock().await = Some(task);

        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        self.cancel.cancel();
        if let Some(task) = self.task.lock().await.take() {
            let _ = task.await;
        }
        Ok(())
    }
}
