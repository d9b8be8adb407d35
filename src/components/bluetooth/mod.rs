mod monitor;

pub use monitor::{
    diff_presence, parse_connected_devices, BluetoothSource, PresenceChange, PresenceMonitor,
    SystemProfilerSource,
};

use super::DisplaySink;
use crate::config::BluetoothSettings;
use crate::error::{AppResult, Error};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Widget and variable mirrored for one device
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeviceBinding {
    uuid: String,
    variable_name: String,
}

/// Tracked devices and the widgets that show them
#[derive(Debug, Clone, Default)]
pub struct BluetoothService {
    devices: HashMap<String, DeviceBinding>,
}

impl BluetoothService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `name`, replacing any earlier binding for the same device
    pub fn add_device(&mut self, name: &str, uuid: &str, variable_name: &str) {
        self.devices.insert(
            name.to_string(),
            DeviceBinding {
                uuid: uuid.to_string(),
                variable_name: variable_name.to_string(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Push the state of every tracked device
    pub fn update_all(&self, connected: &HashSet<String>, sink: &dyn DisplaySink) {
        for name in self.devices.keys() {
            self.set_presence(name, connected.contains(name), sink);
        }
    }

    /// Push one connect or disconnect. Returns false for untracked devices.
    pub fn apply(&self, change: &PresenceChange, sink: &dyn DisplaySink) -> bool {
        self.set_presence(&change.name, change.connected, sink)
    }

    fn set_presence(&self, name: &str, connected: bool, sink: &dyn DisplaySink) -> bool {
        let Some(binding) = self.devices.get(name) else {
            return false;
        };

        let value = if connected { "yes" } else { "no" };
        sink.set_persistent_variable(
            &binding.variable_name,
            value,
            Some(Box::new(|e: &Error| {
                error!("Error sending bluetooth state to BetterTouchTool: {}", e)
            })),
        );
        sink.refresh_widget(&binding.uuid);
        true
    }
}

/// Bluetooth component: one poller shared by every tracked device
pub struct BluetoothComponent {
    service: Arc<BluetoothService>,
    source: Arc<dyn BluetoothSource>,
    interval: Duration,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl BluetoothComponent {
    /// Track every device in `settings`, polling at the shortest configured interval
    pub fn new(settings: &[BluetoothSettings], source: Arc<dyn BluetoothSource>) -> Self {
        let mut service = BluetoothService::new();
        for device in settings {
            service.add_device(&device.device_name, &device.uuid, &device.variable_name);
        }

        let interval = settings
            .iter()
            .map(|device| device.poll_interval)
            .min()
            .unwrap_or(Duration::from_secs(crate::config::DEFAULT_BLUETOOTH_POLL_INTERVAL));

        Self {
            service: Arc::new(service),
            source,
            interval,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl super::Component for BluetoothComponent {
    fn name(&self) -> &'static str {
        "bluetooth"
    }

    async fn init(&self, sink: Arc<dyn DisplaySink>) -> AppResult<()> {
        let mut tasks = self.tasks.lock().await;
        if !tasks.is_empty() {
            warn!("Bluetooth component is already running, skipping initialization");
            return Ok(());
        }

        let initial = match self.source.connected_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                warn!("Could not read Bluetooth devices, assuming none connected: {}", e);
                HashSet::new()
            }
        };
        self.service.update_all(&initial, sink.as_ref());
        info!("Tracking {} Bluetooth devices", self.service.len());

        let monitor = PresenceMonitor::new(Arc::clone(&self.source), self.interval);
        let mut changes = monitor.subscribe();
        tasks.push(tokio::spawn(monitor.run(initial, self.cancel.clone())));

        let service = Arc::clone(&self.service);
        let cancel = self.cancel.clone();
        tasks.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    change = changes.recv() => match change {
                        Some(change) => {
                            service.apply(&change, sink.as_ref());
                        }
                        None => break,
                    },
                }
            }
        }));

        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        self.cancel.cancel();
        for task in self.tasks.lock().await.drain(..) {
            let _ = task.await;
        }
        Ok(())
    }
}
