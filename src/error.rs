use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(eventual::config))]
    Config(String),

    #[error("Calendar error: {0}")]
    #[diagnostic(code(eventual::calendar))]
    Calendar(String),

    #[error("Calendar access has not been granted: {0}")]
    #[diagnostic(
        code(eventual::not_authorized),
        help("Allow Eventual to control Calendar in System Settings > Privacy & Security > Automation")
    )]
    NotAuthorized(String),

    #[error("BetterTouchTool error: {0}")]
    #[diagnostic(code(eventual::display))]
    Display(String),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(eventual::http))]
    Http(#[from] reqwest::Error),

    #[error("Script error: {0}")]
    #[diagnostic(code(eventual::script))]
    Script(String),

    #[error("Device error: {0}")]
    #[diagnostic(code(eventual::device))]
    Device(String),

    #[error("File watch error: {0}")]
    #[diagnostic(code(eventual::watch))]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    #[diagnostic(code(eventual::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(eventual::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(eventual::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for JSON errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create calendar errors
pub fn calendar_error(message: &str) -> Error {
    Error::Calendar(message.to_string())
}

/// Helper to create BetterTouchTool errors
pub fn display_error(message: &str) -> Error {
    Error::Display(message.to_string())
}

/// Helper to create script errors
pub fn script_error(message: &str) -> Error {
    Error::Script(message.to_string())
}

/// Helper to create device errors
pub fn device_error(message: &str) -> Error {
    Error::Device(message.to_string())
}
