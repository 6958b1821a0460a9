//! Error types for config loading

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::merge::Format;

/// Everything that can go wrong while locating, decoding, or overlaying config.
///
/// `HelpRequested` and `VersionRequested` are not failures: they carry the text
/// clap rendered so the caller can print it and exit cleanly.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open config file {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported config file format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Invalid {format} config {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        format: Format,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    FlagParse(clap::Error),

    #[error("{0}")]
    HelpRequested(String),

    #[error("{0}")]
    VersionRequested(String),
}

impl ConfigError {
    /// True for the help/version outcomes, which should exit successfully.
    pub fn is_informational(&self) -> bool {
        matches!(self, ConfigError::HelpRequested(_) | ConfigError::VersionRequested(_))
    }
}

/// Underlying deserializer failure.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
