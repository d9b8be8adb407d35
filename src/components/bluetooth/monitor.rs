use crate::error::{device_error, AppResult};
use crate::utils::subscription::{Publisher, Subscription};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const PRESENCE_BACKLOG: usize = 32;

/// A tracked device connected or disconnected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceChange {
    pub name: String,
    pub connected: bool,
}

/// Where the set of connected device names comes from
#[async_trait]
pub trait BluetoothSource: Send + Sync {
    async fn connected_devices(&self) -> AppResult<HashSet<String>>;
}

/// Reads connected devices from `system_profiler`
#[derive(Debug, Default)]
pub struct SystemProfilerSource;

#[async_trait]
impl BluetoothSource for SystemProfilerSource {
    async fn connected_devices(&self) -> AppResult<HashSet<String>> {
        let output = Command::new("system_profiler")
            .args(["SPBluetoothDataType", "-json"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(device_error(&format!(
                "system_profiler exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_connected_devices(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Names of connected devices in `system_profiler SPBluetoothDataType -json` output
pub fn parse_connected_devices(json: &str) -> AppResult<HashSet<String>> {
    let root: Value = serde_json::from_str(json)?;
    let controllers = root
        .get("SPBluetoothDataType")
        .and_then(Value::as_array)
        .ok_or_else(|| device_error("system_profiler output has no SPBluetoothDataType"))?;

    let names = controllers
        .iter()
        .filter_map(|controller| controller.get("device_connected"))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(Value::as_object)
        .flat_map(|device| device.keys().cloned())
        .collect();

    Ok(names)
}

/// Changes between two snapshots, connections first, each group sorted by name
pub fn diff_presence(previous: &HashSet<String>, current: &HashSet<String>) -> Vec<PresenceChange> {
    let mut connected: Vec<_> = current.difference(previous).cloned().collect();
    let mut disconnected: Vec<_> = previous.difference(current).cloned().collect();
    connected.sort();
    disconnected.sort();

    connected
        .into_iter()
        .map(|name| PresenceChange {
            name,
            connected: true,
        })
        .chain(disconnected.into_iter().map(|name| PresenceChange {
            name,
            connected: false,
        }))
        .collect()
}

/// Polls a [`BluetoothSource`] and publishes connects and disconnects
pub struct PresenceMonitor {
    source: Arc<dyn BluetoothSource>,
    interval: Duration,
    publisher: Publisher<PresenceChange>,
}

impl PresenceMonitor {
    pub fn new(source: Arc<dyn BluetoothSource>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            publisher: Publisher::new(),
        }
    }

    pub fn subscribe(&self) -> Subscription<PresenceChange> {
        self.publisher.subscribe_with_capacity(PRESENCE_BACKLOG)
    }

    /// Poll until `cancel` fires, starting from the `initial` snapshot
    pub async fn run(self, initial: HashSet<String>, cancel: CancellationToken) {
        let mut previous = initial;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.interval) => {}
            }

            match self.source.connected_devices().await {
                Ok(current) => {
                    for change in diff_presence(&previous, &current) {
                        debug!("Bluetooth device {:?}", change);
                        self.publisher.publish(change);
                    }
                    previous = current;
                }
                Err(e) => warn!("Failed to read Bluetooth devices: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILER_OUTPUT: &str = r#"{
      "SPBluetoothDataType" : [
        {
          "controller_properties" : { "controller_state" : "attrib_on" },
          "device_connected" : [
            { "AirPods Pro" : { "device_address" : "AA:BB:CC:DD:EE:01" } },
            { "Magic Keyboard" : { "device_address" : "AA:BB:CC:DD:EE:02" } }
          ],
          "device_not_connected" : [
            { "Old Speaker" : { "device_address" : "AA:BB:CC:DD:EE:03" } }
          ]
        }
      ]
    }"#;

    #[test]
    fn test_parse_connected_devices() {
        let devices = parse_connected_devices(PROFILER_OUTPUT).unwrap();
        assert_eq!(devices.len(), 2);
        assert!(devices.contains("AirPods Pro"));
        assert!(devices.contains("Magic Keyboard"));
        assert!(!devices.contains("Old Speaker"));
    }

    #[test]
    fn test_parse_without_connected_devices() {
        let devices =
            parse_connected_devices(r#"{"SPBluetoothDataType":[{"device_not_connected":[]}]}"#)
                .unwrap();
        assert!(devices.is_empty());

        assert!(parse_connected_devices(r#"{"SPAudioDataType":[]}"#).is_err());
        assert!(parse_connected_devices("not json").is_err());
    }

    #[test]
    fn test_diff_presence() {
        let previous: HashSet<String> = ["AirPods Pro", "Mouse"].map(String::from).into();
        let current: HashSet<String> = ["Mouse", "Keyboard"].map(String::from).into();

        assert_eq!(
            diff_presence(&previous, &current),
            vec![
                PresenceChange {
                    name: "Keyboard".to_string(),
                    connected: true
                },
                PresenceChange {
                    name: "AirPods Pro".to_string(),
                    connected: false
                },
            ]
        );
        assert!(diff_presence(&current, &current).is_empty());
    }
}
