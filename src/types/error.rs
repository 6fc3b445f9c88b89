//! Error types for zcp

use std::path::PathBuf;
use thiserror::Error;

/// Error types for zcp operations
#[derive(Debug, Error)]
pub enum CopyError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration, detected before any copying starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source file could not be opened or statted
    #[error("Cannot open source {}: {}", .path.display(), .source)]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Destination file could not be created or prepared
    #[error("Cannot open destination {}: {}", .path.display(), .source)]
    DestinationOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The transfer primitive failed mid-file
    #[error("Transfer failed for {}: {}", .path.display(), .source)]
    Transfer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A termination signal was observed; cleanup has already run
    #[error("Interrupted by termination signal")]
    Interrupted,
}

impl CopyError {
    /// Check if this error is a configuration/validation error
    pub fn is_config_error(&self) -> bool {
        matches!(self, CopyError::Config(_))
    }

    /// Check if this error is the cancellation path
    pub fn is_interrupted(&self) -> bool {
        matches!(self, CopyError::Interrupted)
    }
}
