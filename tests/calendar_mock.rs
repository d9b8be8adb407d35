use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use eventual::components::calendar::{
    report_state, Authorization, CalendarComponent, CalendarEvent, CalendarScheduler,
    CalendarService, EventSource, ServiceState,
};
use eventual::components::{Component, DisplaySink, ErrorCallback};
use eventual::config::CalendarSettings;
use eventual::error::{calendar_error, AppResult};
use eventual::utils::subscription::{Publisher, Subscription};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

/// Event source serving a fixed list of events
struct MockEventSource {
    events: Vec<CalendarEvent>,
    authorized: AtomicBool,
    failing: AtomicBool,
    fetches: AtomicUsize,
    changes: Publisher<()>,
}

impl MockEventSource {
    fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            authorized: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            changes: Publisher::new(),
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn authorization(&self) -> AppResult<Authorization> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(Authorization::Authorized)
        } else {
            Ok(Authorization::Denied)
        }
    }

    async fn fetch_events(
        &self,
        calendars: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CalendarEvent>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(calendar_error("store unavailable"));
        }

        Ok(self
            .events
            .iter()
            .filter(|event| calendars.contains(&event.calendar))
            .filter(|event| event.start.is_some_and(|s| s < end) && event.end.is_some_and(|e| e > start))
            .cloned()
            .collect())
    }

    fn on_store_changed(&self) -> Subscription<()> {
        self.changes.subscribe()
    }
}

/// Records every widget update
#[derive(Default)]
struct RecordingSink {
    updates: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    fn updates(&self) -> Vec<(String, String)> {
        self.updates.lock().unwrap().clone()
    }
}

impl DisplaySink for RecordingSink {
    fn update_widget(&self, uuid: &str, text: &str, _icon_data: Option<&str>) {
        self.updates
            .lock()
            .unwrap()
            .push((uuid.to_string(), text.to_string()));
    }

    fn refresh_widget(&self, _uuid: &str) {}

    fn set_persistent_variable(&self, _name: &str, _value: &str, _on_error: Option<ErrorCallback>) {}
}

fn settings(uuids: &[&str], update_interval: Duration) -> CalendarSettings {
    CalendarSettings {
        uuids: uuids.iter().map(|uuid| uuid.to_string()).collect(),
        calendar_names: vec!["Work".to_string()],
        calendar_symbols: "◎".to_string(),
        lookahead_hours: 48,
        update_interval,
        carriage_returns: false,
        max_event_length: 30,
        day_separators: false,
        store_path: None,
    }
}

fn service(uuids: &[&str], update_interval: Duration) -> CalendarService {
    CalendarService::new(settings(uuids, update_interval), Some(chrono_tz::UTC))
}

fn upcoming(title: &str, calendar: &str, hours_ahead: i64) -> CalendarEvent {
    let start = Utc::now() + ChronoDuration::hours(hours_ahead);
    CalendarEvent::timed(title, calendar, start, start + ChronoDuration::minutes(30))
}

async fn wait_until(condition: impl Fn() -> bool) {
    timeout(WAIT, async {
        while !condition() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_refresh_all_updates_every_widget() {
    let source = Arc::new(MockEventSource::new(vec![
        upcoming("Planning", "Work", 3),
        upcoming("Football", "Personal", 4),
    ]));
    let sink = Arc::new(RecordingSink::default());

    let (scheduler, _state) = CalendarScheduler::new(
        vec![service(&["A", "B", "C"], Duration::from_secs(40))],
        source.clone(),
        sink.clone(),
    );
    scheduler.refresh_all().await;

    let updates = sink.updates();
    assert_eq!(updates.len(), 3);
    assert_eq!(updates[0].0, "A");
    assert!(updates[0].1.starts_with("◎ Planning"));
    // Events from calendars that are not configured are not shown
    assert_eq!(updates[1], ("B".to_string(), String::new()));
    assert_eq!(updates[2], ("C".to_string(), String::new()));
}

#[tokio::test]
async fn test_refresh_all_without_events() {
    let source = Arc::new(MockEventSource::new(Vec::new()));
    let sink = Arc::new(RecordingSink::default());

    let (scheduler, _state) = CalendarScheduler::new(
        vec![service(&["A", "B"], Duration::from_secs(40))],
        source,
        sink.clone(),
    );
    scheduler.refresh_all().await;

    assert_eq!(
        sink.updates(),
        vec![
            ("A".to_string(), "No calendar events".to_string()),
            ("B".to_string(), String::new()),
        ]
    );
}

#[tokio::test]
async fn test_failed_fetch_skips_refresh() {
    let source = Arc::new(MockEventSource::new(vec![upcoming("Planning", "Work", 3)]));
    source.failing.store(true, Ordering::SeqCst);
    let sink = Arc::new(RecordingSink::default());

    let (scheduler, _state) = CalendarScheduler::new(
        vec![
            service(&["A"], Duration::from_secs(40)),
            service(&["B"], Duration::from_secs(40)),
        ],
        source.clone(),
        sink.clone(),
    );
    scheduler.refresh_all().await;

    // Both services were attempted, neither pushed anything
    assert_eq!(source.fetches(), 2);
    assert!(sink.updates().is_empty());
}

#[tokio::test]
async fn test_tick_interval_is_shortest_service_interval() {
    let (scheduler, _state) = CalendarScheduler::new(
        vec![
            service(&["A"], Duration::from_secs(60)),
            service(&["B"], Duration::from_secs(15)),
        ],
        Arc::new(MockEventSource::new(Vec::new())),
        Arc::new(RecordingSink::default()),
    );

    assert_eq!(scheduler.tick_interval(), Duration::from_secs(15));
}

#[tokio::test]
async fn test_waits_for_authorization() {
    let source = Arc::new(MockEventSource::new(vec![upcoming("Planning", "Work", 3)]));
    source.authorized.store(false, Ordering::SeqCst);
    let sink = Arc::new(RecordingSink::default());

    let (scheduler, mut state) = CalendarScheduler::new(
        vec![service(&["A"], Duration::from_secs(3600))],
        source.clone(),
        sink.clone(),
    );
    let scheduler = scheduler.with_authorization_poll(Duration::from_millis(10));

    let cancel = CancellationToken::new();
    let task = tokio::spawn(scheduler.run(cancel.clone()));

    timeout(WAIT, state.wait_for(|s| *s == ServiceState::AwaitingAuthorization))
        .await
        .unwrap()
        .unwrap();
    assert!(sink.updates().is_empty());

    source.authorized.store(true, Ordering::SeqCst);
    timeout(WAIT, state.wait_for(|s| *s == ServiceState::Running))
        .await
        .unwrap()
        .unwrap();

    // The first tick refreshes immediately
    wait_until(|| sink.updates().len() == 1).await;

    cancel.cancel();
    task.await.unwrap();
    assert_eq!(*state.borrow(), ServiceState::Stopped);
}

#[tokio::test]
async fn test_cancel_while_awaiting_authorization() {
    let source = Arc::new(MockEventSource::new(Vec::new()));
    source.authorized.store(false, Ordering::SeqCst);

    let (scheduler, state) = CalendarScheduler::new(
        vec![service(&["A"], Duration::from_secs(3600))],
        source.clone(),
        Arc::new(RecordingSink::default()),
    );
    let scheduler = scheduler.with_authorization_poll(Duration::from_millis(10));

    let cancel = CancellationToken::new();
    cancel.cancel();
    timeout(WAIT, scheduler.run(cancel)).await.unwrap();

    assert_eq!(*state.borrow(), ServiceState::Stopped);
    assert_eq!(source.fetches(), 0);
}

#[tokio::test]
async fn test_store_change_triggers_refresh() {
    let source = Arc::new(MockEventSource::new(vec![upcoming("Planning", "Work", 3)]));
    let sink = Arc::new(RecordingSink::default());

    let (scheduler, _state) = CalendarScheduler::new(
        vec![service(&["A"], Duration::from_secs(3600))],
        source.clone(),
        sink.clone(),
    );

    let cancel = CancellationToken::new();
    let task = tokio::spawn(scheduler.run(cancel.clone()));

    wait_until(|| source.fetches() == 1).await;

    // A burst of changes settles into a single refresh
    source.changes.publish(());
    source.changes.publish(());
    wait_until(|| source.fetches() == 2).await;
    sleep(Duration::from_millis(700)).await;
    assert_eq!(source.fetches(), 2);

    cancel.cancel();
    task.await.unwrap();
    assert_eq!(sink.updates().len(), 2);
}

#[tokio::test]
async fn test_cancel_during_change_settle() {
    let source = Arc::new(MockEventSource::new(vec![upcoming("Planning", "Work", 3)]));
    let sink = Arc::new(RecordingSink::default());

    let (scheduler, state) = CalendarScheduler::new(
        vec![service(&["A"], Duration::from_secs(3600))],
        source.clone(),
        sink.clone(),
    );

    let cancel = CancellationToken::new();
    let task = tokio::spawn(scheduler.run(cancel.clone()));
    wait_until(|| source.fetches() == 1).await;

    source.changes.publish(());
    sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    // Stops well before the settle delay would have elapsed
    timeout(Duration::from_millis(300), task)
        .await
        .expect("scheduler kept settling after cancel")
        .unwrap();
    assert_eq!(source.fetches(), 1);
    assert_eq!(*state.borrow(), ServiceState::Stopped);
}

#[tokio::test]
async fn test_oversized_lookahead_skips_refresh() {
    let source = Arc::new(MockEventSource::new(vec![upcoming("Planning", "Work", 3)]));
    let sink = Arc::new(RecordingSink::default());

    let mut oversized = settings(&["A"], Duration::from_secs(40));
    oversized.lookahead_hours = u32::MAX;
    let service = CalendarService::new(oversized, Some(chrono_tz::UTC));

    assert!(service
        .refresh(source.as_ref(), sink.as_ref(), Utc::now())
        .await
        .is_err());
    assert_eq!(source.fetches(), 0);
    assert!(sink.updates().is_empty());
}

#[tokio::test]
async fn test_component_reports_awaiting_authorization() {
    let source = Arc::new(MockEventSource::new(Vec::new()));
    source.authorized.store(false, Ordering::SeqCst);

    let component = CalendarComponent::new(
        vec![service(&["A"], Duration::from_secs(3600))],
        source.clone(),
    );
    let mut state = component.watch_state();
    assert_eq!(*state.borrow(), ServiceState::Starting);

    let reporter = tokio::spawn(report_state(component.watch_state()));

    component
        .init(Arc::new(RecordingSink::default()))
        .await
        .unwrap();
    timeout(WAIT, state.wait_for(|s| *s == ServiceState::AwaitingAuthorization))
        .await
        .unwrap()
        .unwrap();

    component.shutdown().await.unwrap();
    assert_eq!(*state.borrow(), ServiceState::Stopped);

    // The reporter finishes once the component has stopped
    timeout(WAIT, reporter).await.unwrap().unwrap();
    assert_eq!(source.fetches(), 0);
}
