use crate::error::{config_error, AppResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default glyphs used to prefix events from each configured calendar
pub const DEFAULT_CALENDAR_SYMBOLS: &str = "◎●○◉⦿";
/// Default lookahead window in hours
pub const DEFAULT_LOOKAHEAD_HOURS: u32 = 48;
/// Default calendar refresh interval in seconds
pub const DEFAULT_UPDATE_INTERVAL: u64 = 40;
/// Default maximum event title length (0 disables truncation)
pub const DEFAULT_MAX_EVENT_LENGTH: usize = 30;
/// Default audio polling interval in seconds
pub const DEFAULT_AUDIO_POLL_INTERVAL: u64 = 2;
/// Default Bluetooth polling interval in seconds
pub const DEFAULT_BLUETOOTH_POLL_INTERVAL: u64 = 5;

/// Main configuration structure, read from the file given on the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Services to run
    pub services: Vec<ServiceConfig>,
    /// Base URL of the BetterTouchTool web server, e.g. `http://127.0.0.1:12345`
    pub btt_server_name: String,
    /// Shared secret configured in BetterTouchTool
    pub btt_secret: String,
    /// IANA timezone used to render event times. System local time when absent.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Kind of service an entry in the config file describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Calendar,
    Audio,
    Bluetooth,
}

/// A single service entry. Fields other than `type` and `uuids` only apply to some kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    /// BetterTouchTool widget UUIDs
    pub uuids: Vec<String>,

    // Calendar
    #[serde(default)]
    pub calendar_names: Option<String>,
    #[serde(default)]
    pub calendar_symbols: Option<String>,
    #[serde(default)]
    pub lookahead_hours: Option<u32>,
    #[serde(default)]
    pub update_interval: Option<u64>,
    #[serde(default)]
    pub carriage_returns: Option<bool>,
    #[serde(default)]
    pub max_event_length: Option<usize>,
    #[serde(default)]
    pub day_separators: Option<bool>,
    #[serde(default)]
    pub calendar_store_path: Option<PathBuf>,

    // Bluetooth
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub variable_name: Option<String>,

    // Audio and Bluetooth
    #[serde(default)]
    pub poll_interval: Option<u64>,
    /// Volume key -> PNG file replacing the built-in icon
    #[serde(default)]
    pub icons: Option<HashMap<String, PathBuf>>,
}

/// Resolved settings for one calendar integration
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSettings {
    pub uuids: Vec<String>,
    pub calendar_names: Vec<String>,
    pub calendar_symbols: String,
    pub lookahead_hours: u32,
    pub update_interval: Duration,
    pub carriage_returns: bool,
    pub max_event_length: usize,
    pub day_separators: bool,
    pub store_path: Option<PathBuf>,
}

/// Resolved settings for the audio widget
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSettings {
    pub uuid: String,
    pub poll_interval: Duration,
    /// Volume key -> base64 encoded PNG
    pub icon_overrides: HashMap<String, String>,
}

/// Resolved settings for one tracked Bluetooth device
#[derive(Debug, Clone, PartialEq)]
pub struct BluetoothSettings {
    pub device_name: String,
    pub uuid: String,
    pub variable_name: String,
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from `.env`, the environment and the given config file
    pub fn load(path: &Path) -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        if !path.exists() {
            return Err(config_error(&format!(
                "File {} does not exist.",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!("Cannot load config file {}: {}", path.display(), e))
        })?;

        let mut config = Self::parse(&content, path)?;

        if let Ok(server) = env::var("EVENTUAL_BTT_SERVER") {
            config.btt_server_name = server;
        }
        if let Ok(secret) = env::var("EVENTUAL_BTT_SECRET") {
            config.btt_secret = secret;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse config file contents. TOML when the file ends in `.toml`, JSON otherwise.
    pub fn parse(content: &str, path: &Path) -> AppResult<Self> {
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let parsed = if is_toml {
            toml::from_str::<Config>(content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str::<Config>(content).map_err(|e| e.to_string())
        };

        parsed.map_err(|e| {
            config_error(&format!("Couldn't decode config file {}: {}", path.display(), e))
        })
    }

    /// Check the cross-field rules serde cannot express
    pub fn validate(&self) -> AppResult<()> {
        if self.services.is_empty() {
            return Err(config_error("No services defined in config file."));
        }
        if self.btt_server_name.trim().is_empty() {
            return Err(config_error("Required parameter bttServerName is not set."));
        }

        for service in &self.services {
            if service.uuids.is_empty() {
                return Err(config_error(&format!(
                    "Service of type {:?} needs at least one widget UUID.",
                    service.kind
                )));
            }
            match service.kind {
                ServiceKind::Calendar => {
                    if service.calendar_names.is_none() {
                        return Err(config_error("Required parameter calendarNames is not set."));
                    }
                }
                ServiceKind::Audio => {}
                ServiceKind::Bluetooth => {
                    if service.device_name.is_none() || service.variable_name.is_none() {
                        return Err(config_error(
                            "Bluetooth service requires 'deviceName' and 'variableName' to be set.",
                        ));
                    }
                }
            }
        }

        self.display_timezone()?;
        Ok(())
    }

    /// Timezone used for rendering, `None` meaning system local time
    pub fn display_timezone(&self) -> AppResult<Option<Tz>> {
        match &self.timezone {
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|_| config_error(&format!("Unknown timezone {}", name))),
            None => Ok(None),
        }
    }

    /// Services of the given kind
    pub fn services_of(&self, kind: ServiceKind) -> impl Iterator<Item = &ServiceConfig> {
        self.services.iter().filter(move |s| s.kind == kind)
    }
}

impl ServiceConfig {
    /// Calendar settings with defaults applied
    pub fn calendar_settings(&self) -> AppResult<CalendarSettings> {
        let names = self
            .calendar_names
            .as_deref()
            .ok_or_else(|| config_error("Required parameter calendarNames is not set."))?;

        Ok(CalendarSettings {
            uuids: self.uuids.clone(),
            calendar_names: names.split(',').map(|name| name.to_string()).collect(),
            calendar_symbols: self
                .calendar_symbols
                .clone()
                .unwrap_or_else(|| DEFAULT_CALENDAR_SYMBOLS.to_string()),
            lookahead_hours: self.lookahead_hours.unwrap_or(DEFAULT_LOOKAHEAD_HOURS),
            update_interval: Duration::from_secs(
                self.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL).max(1),
            ),
            carriage_returns: self.carriage_returns.unwrap_or(false),
            max_event_length: self.max_event_length.unwrap_or(DEFAULT_MAX_EVENT_LENGTH),
            day_separators: self.day_separators.unwrap_or(false),
            store_path: self.calendar_store_path.clone(),
        })
    }

    /// Audio settings with defaults applied and icon overrides read from disk
    pub fn audio_settings(&self) -> AppResult<AudioSettings> {
        let uuid = self
            .uuids
            .first()
            .cloned()
            .ok_or_else(|| config_error("Audio service needs a widget UUID."))?;

        let mut icon_overrides = HashMap::new();
        if let Some(icons) = &self.icons {
            for (key, path) in icons {
                let bytes = fs::read(path).map_err(|e| {
                    config_error(&format!("Cannot read icon {}: {}", path.display(), e))
                })?;
                icon_overrides.insert(key.clone(), BASE64.encode(bytes));
            }
        }

        Ok(AudioSettings {
            uuid,
            poll_interval: Duration::from_secs(
                self.poll_interval.unwrap_or(DEFAULT_AUDIO_POLL_INTERVAL).max(1),
            ),
            icon_overrides,
        })
    }

    /// Bluetooth settings
    pub fn bluetooth_settings(&self) -> AppResult<BluetoothSettings> {
        let missing = || {
            config_error("Bluetooth service requires 'deviceName' and 'variableName' to be set.")
        };

        Ok(BluetoothSettings {
            device_name: self.device_name.clone().ok_or_else(missing)?,
            variable_name: self.variable_name.clone().ok_or_else(missing)?,
            uuid: self
                .uuids
                .first()
                .cloned()
                .ok_or_else(|| config_error("Bluetooth service needs a widget UUID."))?,
            poll_interval: Duration::from_secs(
                self.poll_interval
                    .unwrap_or(DEFAULT_BLUETOOTH_POLL_INTERVAL)
                    .max(1),
            ),
        })
    }
}
