use podcax_core::{MediaError, PlatformError};

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the podcax binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Media session error from podcax-core.
    #[error("Media error: {source} {location}")]
    Media {
        /// The underlying media error.
        #[source]
        source: MediaError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A host capability failed outside of a media session.
    #[error("Platform error: {source} {location}")]
    Platform {
        /// The underlying platform failure.
        #[source]
        source: PlatformError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A line typed on stdin is not a known command.
    #[error("Invalid command '{input}': {reason} {location}")]
    InvalidCommand {
        /// The rejected input.
        input: String,
        /// Human-readable reason for rejection.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to send message through async channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

// Manual From<MediaError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<MediaError> for AppError {
    #[track_caller]
    fn from(source: MediaError) -> Self {
        AppError::Media {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<PlatformError> for AppError {
    #[track_caller]
    fn from(source: PlatformError) -> Self {
        AppError::Platform {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
