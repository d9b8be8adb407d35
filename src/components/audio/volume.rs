use crate::error::{device_error, AppResult};
use crate::utils::osascript::{self, Language};
use crate::utils::subscription::{Publisher, Subscription};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Volume changes a slow listener may fall behind by before changes are dropped
const CHANGE_BACKLOG: usize = 16;

/// Output volume and mute state of the default output device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeState {
    /// Scalar between 0 and 1, `None` when the device has no software volume
    pub volume: Option<f32>,
    pub muted: bool,
}

impl VolumeState {
    /// Icon key: `0`-`3` by loudness, prefixed with `-` when muted, `default` when unknown
    pub fn key(&self) -> String {
        let Some(volume) = self.volume else {
            return "default".to_string();
        };

        let level = if volume > 0.65 {
            "3"
        } else if volume > 0.32 {
            "2"
        } else if volume > 0.05 {
            "1"
        } else {
            "0"
        };

        if self.muted {
            format!("-{}", level)
        } else {
            level.to_string()
        }
    }
}

/// Where the current volume is read from
#[async_trait]
pub trait VolumeSource: Send + Sync {
    async fn read(&self) -> AppResult<VolumeState>;
}

/// Reads the volume through AppleScript's `get volume settings`
#[derive(Debug, Default)]
pub struct AppleScriptVolume;

#[async_trait]
impl VolumeSource for AppleScriptVolume {
    async fn read(&self) -> AppResult<VolumeState> {
        let output = osascript::run(Language::AppleScript, "get volume settings").await?;
        parse_volume_settings(&output)
    }
}

/// Parse output such as `output volume:44, input volume:50, alert volume:100, output muted:false`
pub fn parse_volume_settings(output: &str) -> AppResult<VolumeState> {
    let mut volume = None;
    let mut muted = false;
    let mut seen_volume = false;

    for part in output.split(',') {
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };
        match key.trim() {
            "output volume" => {
                seen_volume = true;
                volume = value
                    .trim()
                    .parse::<f32>()
                    .ok()
                    .map(|percent| (percent / 100.0).clamp(0.0, 1.0));
            }
            "output muted" => muted = value.trim() == "true",
            _ => {}
        }
    }

    if !seen_volume {
        return Err(device_error(&format!(
            "Unexpected volume settings: {}",
            output.trim()
        )));
    }

    Ok(VolumeState { volume, muted })
}

/// Polls a [`VolumeSource`] and publishes every change
pub struct VolumeMonitor {
    source: Arc<dyn VolumeSource>,
    interval: Duration,
    publisher: Publisher<VolumeState>,
}

impl VolumeMonitor {
    pub fn new(source: Arc<dyn VolumeSource>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            publisher: Publisher::new(),
        }
    }

    /// Receive the initial state and every change after it
    pub fn subscribe(&self) -> Subscription<VolumeState> {
        self.publisher.subscribe_with_capacity(CHANGE_BACKLOG)
    }

    /// Poll until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        let mut last: Option<VolumeState> = None;
        let mut failing = false;

        loop {
            match self.source.read().await {
                Ok(state) => {
                    failing = false;
                    if last != Some(state) {
                        debug!("Volume changed to {:?}", state);
                        last = Some(state);
                        self.publisher.publish(state);
                    }
                }
                Err(e) => {
                    if !failing {
                        warn!("Failed to read volume: {}", e);
                        failing = true;
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.interval) => {}
            }
        }
    }
}
