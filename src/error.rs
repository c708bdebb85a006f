use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZencpError {
    #[error("zencp error: {0}")]
    Generic(String),
    #[error(transparent)]
    Expected(#[from] ZencpExpectedError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Tag error: {0}")]
    Tags(#[from] lofty::error::LoftyError),
    #[error("Failed to decode configuration file: invalid TOML: {0}")]
    ConfigDecode(#[from] toml::de::Error),
    #[error("Logging error: {0}")]
    Logging(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZencpExpectedError {
    #[error("Invalid input: {field} must not be empty")]
    InvalidInput { field: &'static str },
    #[error("Unable to allocate memory for {what}")]
    AllocationFailure { what: &'static str },
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("File is empty: {}", path.display())]
    EmptyFile { path: PathBuf },
    #[error("Unsupported file type: {}", path.display())]
    UnsupportedFiletype { path: PathBuf },
    #[error("Track does not exist: {track_id}")]
    TrackDoesNotExist { track_id: u32 },
    #[error("Configuration file not found ({})", path.display())]
    ConfigNotFound { path: PathBuf },
    #[error("Invalid value for {key} in configuration file ({}): {message}", path.display())]
    InvalidConfigValue { key: &'static str, path: PathBuf, message: String },
    #[error("No player found")]
    NoDevice,
    #[error("No player with ID {device_id}")]
    DeviceNotFound { device_id: u32 },
    #[error("Player communication failed: {0}")]
    Device(String),
}

pub type Result<T> = std::result::Result<T, ZencpError>;
