use super::service::CalendarService;
use super::source::{Authorization, EventSource};
use super::ServiceState;
use crate::components::DisplaySink;
use crate::utils::subscription::Subscription;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How often calendar access is re-checked while waiting for the user to grant it
const AUTHORIZATION_POLL: Duration = Duration::from_secs(1);
/// Store changes arrive in bursts; wait this long for the burst to settle
const CHANGE_SETTLE: Duration = Duration::from_millis(500);

/// Drives every calendar service from one timer and the store-changed notifications
pub struct CalendarScheduler {
    services: Vec<CalendarService>,
    source: Arc<dyn EventSource>,
    sink: Arc<dyn DisplaySink>,
    state: watch::Sender<ServiceState>,
    authorization_poll: Duration,
}

impl CalendarScheduler {
    /// Create a scheduler owning `services`. The receiver reports its progress.
    pub fn new(
        services: Vec<CalendarService>,
        source: Arc<dyn EventSource>,
        sink: Arc<dyn DisplaySink>,
    ) -> (Self, watch::Receiver<ServiceState>) {
        let (state, state_rx) = watch::channel(ServiceState::Starting);
        (Self::with_state(services, source, sink, state), state_rx)
    }

    /// Create a scheduler reporting its progress through an existing channel
    pub fn with_state(
        services: Vec<CalendarService>,
        source: Arc<dyn EventSource>,
        sink: Arc<dyn DisplaySink>,
        state: watch::Sender<ServiceState>,
    ) -> Self {
        Self {
            services,
            source,
            sink,
            state,
            authorization_poll: AUTHORIZATION_POLL,
        }
    }

    /// Override how often access is re-checked while awaiting authorization
    pub fn with_authorization_poll(mut self, poll: Duration) -> Self {
        self.authorization_poll = poll;
        self
    }

    /// Shortest refresh interval among the services
    pub fn tick_interval(&self) -> Duration {
        self.services
            .iter()
            .map(|service| service.settings().update_interval)
            .min()
            .unwrap_or(Duration::from_secs(crate::config::DEFAULT_UPDATE_INTERVAL))
    }

    /// Recompute and push every service's widgets. Passes run one after another.
    pub async fn refresh_all(&self) {
        let now = Utc::now();
        for service in &self.services {
            if let Err(e) = service
                .refresh(self.source.as_ref(), self.sink.as_ref(), now)
                .await
            {
                error!("Failed to refresh calendar widgets: {}", e);
            }
        }
    }

    /// Wait until calendar access is granted. Returns false if cancelled first.
    pub async fn wait_for_authorization(&self, cancel: &CancellationToken) -> bool {
        let mut reported = false;

        loop {
            match self.source.authorization().await {
                Ok(Authorization::Authorized) => {
                    if reported {
                        info!("Calendar access granted");
                    }
                    return true;
                }
                Ok(Authorization::Denied) => {
                    if !reported {
                        warn!("You must allow Eventual to access your calendar events in order for it to show them to you.");
                        self.state.send_replace(ServiceState::AwaitingAuthorization);
                        reported = true;
                    }
                }
                Err(e) => warn!("Could not check calendar access: {}", e),
            }

            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = sleep(self.authorization_poll) => {}
            }
        }
    }

    /// Run until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        let mut changes = Some(self.source.on_store_changed());

        if !self.wait_for_authorization(&cancel).await {
            self.state.send_replace(ServiceState::Stopped);
            return;
        }
        self.state.send_replace(ServiceState::Running);

        let interval = self.tick_interval();
        info!(
            "Calendar scheduler running {} services every {:?}",
            self.services.len(),
            interval
        );

        // The first tick completes immediately and performs the initial refresh
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.refresh_all().await,
                change = next_change(&mut changes) => match change {
                    Some(()) => {
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = sleep(CHANGE_SETTLE) => {}
                        }
                        if let Some(subscription) = changes.as_mut() {
                            subscription.drain();
                        }
                        debug!("Calendar store changed");
                        self.refresh_all().await;
                    }
                    None => {
                        warn!("Calendar store notifications ended, relying on the refresh timer");
                        changes = None;
                    }
                },
            }
        }

        self.state.send_replace(ServiceState::Stopped);
        info!("Calendar scheduler stopped");
    }
}

async fn next_change(changes: &mut Option<Subscription<()>>) -> Option<()> {
    match changes {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}
