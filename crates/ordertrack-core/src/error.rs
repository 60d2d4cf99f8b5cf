use thiserror::Error;

/// Errors raised by the ambient layer of ordertrack-core (config, storage).
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

/// A structural submit-time constraint was violated.
///
/// Blocks submission. `field` names the control that should receive focus,
/// when there is a single offending control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn on_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

/// A persisted draft could not be decoded. Never surfaced to the user.
#[derive(Debug, Error)]
#[error("corrupt draft: {0}")]
pub struct DraftParseError(#[from] pub serde_json::Error);
