mod icons;
pub mod volume;

pub use icons::builtin_icon;
pub use volume::{AppleScriptVolume, VolumeMonitor, VolumeSource, VolumeState};

use super::DisplaySink;
use crate::config::AudioSettings;
use crate::error::{AppResult, Error};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Persistent variable the volume widget reads its text and icon from
pub const VOLUME_VARIABLE: &str = "volstate";

/// Mirrors the output volume into the volume widget's icon
pub struct AudioService {
    settings: AudioSettings,
    last_key: std::sync::Mutex<Option<String>>,
}

impl AudioService {
    pub fn new(settings: AudioSettings) -> Self {
        Self {
            settings,
            last_key: std::sync::Mutex::new(None),
        }
    }

    /// Icon for a volume key, preferring configured overrides
    pub fn icon_for(&self, key: &str) -> &str {
        self.settings
            .icon_overrides
            .get(key)
            .map(String::as_str)
            .unwrap_or_else(|| builtin_icon(key))
    }

    /// Push a new icon when the volume key changed. Returns whether anything was sent.
    pub fn update(&self, state: &VolumeState, sink: &dyn DisplaySink) -> bool {
        let key = state.key();
        {
            let mut last_key = self
                .last_key
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if last_key.as_deref() == Some(key.as_str()) {
                return false;
            }
            *last_key = Some(key.clone());
        }

        let payload = serde_json::json!({
            "text": "Volume",
            "icon_data": self.icon_for(&key),
        })
        .to_string();

        sink.set_persistent_variable(
            VOLUME_VARIABLE,
            &payload,
            Some(Box::new(|e: &Error| {
                error!("Error updating BetterTouchTool with volume icon data: {}", e)
            })),
        );
        sink.refresh_widget(&self.settings.uuid);

        true
    }
}

/// Audio component: polls the volume and feeds changes to the [`AudioService`]
pub struct AudioComponent {
    service: Arc<AudioService>,
    monitor: Mutex<Option<VolumeMonitor>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl AudioComponent {
    pub fn new(settings: AudioSettings, source: Arc<dyn VolumeSource>) -> Self {
        let monitor = VolumeMonitor::new(source, settings.poll_interval);
        Self {
            service: Arc::new(AudioService::new(settings)),
            monitor: Mutex::new(Some(monitor)),
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl super::Component for AudioComponent {
    fn name(&self) -> &'static str {
        "audio"
    }

    async fn init(&self, sink: Arc<dyn DisplaySink>) -> AppResult<()> {
        let Some(monitor) = self.monitor.lock().await.take() else {
            warn!("Audio component is already running, skipping initialization");
            return Ok(());
        };

        // Subscribe before the monitor starts so the initial state is not missed
        let mut changes = monitor.subscribe();
        let monitor_task = tokio::spawn(monitor.run(self.cancel.clone()));

        let service = Arc::clone(&self.service);
        let cancel = self.cancel.clone();
        let listener_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    state = changes.recv() => match state {
                        Some(state) => {
                            service.update(&state, sink.as_ref());
                        }
                        None => break,
                    },
                }
            }
            info!("Audio listener stopped");
        });

        self.tasks.lock().await.extend([monitor_task, listener_task]);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ErrorCallback;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        variables: StdMutex<Vec<(String, String)>>,
        refreshes: StdMutex<Vec<String>>,
    }

    impl DisplaySink for RecordingSink {
        fn update_widget(&self, _uuid: &str, _text: &str, _icon_data: Option<&str>) {}

        fn refresh_widget(&self, uuid: &str) {
            self.refreshes.lock().unwrap().push(uuid.to_string());
        }

        fn set_persistent_variable(&self, name: &str, value: &str, _on_error: Option<ErrorCallback>) {
            self.variables
                .lock()
                .unwrap()
                .push((name.to_string(), value.to_string()));
        }
    }

    fn settings(overrides: HashMap<String, String>) -> AudioSettings {
        AudioSettings {
            uuid: "VOL-UUID".to_string(),
            poll_interval: Duration::from_secs(1),
            icon_overrides: overrides,
        }
    }

    fn state(volume: f32, muted: bool) -> VolumeState {
        VolumeState {
            volume: Some(volume),
            muted,
        }
    }

    #[test]
    fn test_update_only_on_key_change() {
        let service = AudioService::new(settings(HashMap::new()));
        let sink = RecordingSink::default();

        assert!(service.update(&state(0.5, false), &sink));
        // Same bucket, nothing to send
        assert!(!service.update(&state(0.6, false), &sink));
        assert!(service.update(&state(0.6, true), &sink));

        let variables = sink.variables.lock().unwrap();
        assert_eq!(variables.len(), 2);
        assert_eq!(variables[0].0, VOLUME_VARIABLE);

        let payload: serde_json::Value = serde_json::from_str(&variables[0].1).unwrap();
        assert_eq!(payload["text"], "Volume");
        assert_eq!(payload["icon_data"], builtin_icon("2"));

        let muted: serde_json::Value = serde_json::from_str(&variables[1].1).unwrap();
        assert_eq!(muted["icon_data"], builtin_icon("-2"));

        assert_eq!(*sink.refreshes.lock().unwrap(), vec!["VOL-UUID", "VOL-UUID"]);
    }

    #[test]
    fn test_icon_overrides_win() {
        let overrides = HashMap::from([("3".to_string(), "Y3VzdG9t".to_string())]);
        let service = AudioService::new(settings(overrides));

        assert_eq!(service.icon_for("3"), "Y3VzdG9t");
        assert_eq!(service.icon_for("1"), builtin_icon("1"));
        assert_eq!(service.icon_for("default"), builtin_icon("default"));
    }
}
