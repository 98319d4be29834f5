//! Error types for the sitestamp core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for sitestamp.
///
/// Every variant aborts the build. The first violation found is the one
/// reported.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A page violates the required HTML shape.
    #[error("Structure error in {path}: {message}")]
    Structure { path: PathBuf, message: String },

    /// An unexpected file or subdirectory exists where only allow-listed
    /// entries are permitted.
    #[error("Layout error at {path}: {message}")]
    Layout { path: PathBuf, message: String },

    /// Category names and paths disagree across the site.
    #[error("Consistency error at {path}: {message}")]
    Consistency { path: PathBuf, message: String },

    /// Configuration loading or parsing error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Timestamp ledger could not be read or written.
    #[error("Ledger error in {path}: {message}")]
    Ledger { path: PathBuf, message: String },

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Generic configuration crate error.
    #[error("Config crate error: {0}")]
    ConfigCrate(#[from] config::ConfigError),
}

impl CoreError {
    /// Create a new structure error.
    pub fn structure(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Structure {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new layout error.
    pub fn layout(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Layout {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new consistency error.
    pub fn consistency(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Consistency {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new ledger error.
    pub fn ledger(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Ledger {
            path: path.into(),
            message: message.into(),
        }
    }
}
