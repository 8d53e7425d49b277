use crate::playback::PlaybackState;

use error_location::ErrorLocation;
use thiserror::Error;

/// Failure reported by a platform capability (recorder, player, picker, storage, upload).
///
/// Capabilities only describe what went wrong; the sessions decide which
/// [`MediaError`] variant the failure becomes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct PlatformError {
    /// Human-readable description from the platform.
    pub reason: String,
}

impl PlatformError {
    /// Build a platform error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Media session errors with source location tracking.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The user refused a platform permission (microphone, photo library).
    #[error("Permission denied: {capability} {location}")]
    PermissionDenied {
        /// Which capability asked for the permission.
        capability: &'static str,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Starting or stopping an audio capture failed.
    #[error("Recording failed during {operation}: {source} {location}")]
    RecordingFailed {
        /// `"start"` or `"stop"`.
        operation: &'static str,
        /// Underlying platform failure.
        #[source]
        source: PlatformError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recording is already in progress.
    #[error("A recording session is already active {location}")]
    RecordingActive {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No recording is in progress.
    #[error("No recording session is active {location}")]
    NotRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The audio resource could not be opened for playback.
    #[error("Failed to load {uri}: {source} {location}")]
    LoadError {
        /// Resource that failed to load.
        uri: String,
        /// Underlying platform failure.
        #[source]
        source: PlatformError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A play/pause/seek/volume/rate call failed on a loaded sound.
    #[error("Playback error: {source} {location}")]
    PlaybackError {
        /// Underlying platform failure.
        #[source]
        source: PlatformError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The operation is not valid in the session's current state.
    #[error("Cannot {operation} while {state:?} {location}")]
    InvalidState {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the session was in.
        state: PlaybackState,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A numeric parameter was not a finite number.
    #[error("Invalid {parameter}: {value} {location}")]
    InvalidParameter {
        /// Parameter name.
        parameter: &'static str,
        /// Rejected value.
        value: f32,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// There is no audio handle to operate on.
    #[error("No audio selected {location}")]
    NoAudioSelected {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The handle an edit targets is no longer the current audio handle.
    #[error("Audio handle {id} is no longer selected {location}")]
    HandleReplaced {
        /// Identifier of the stale handle.
        id: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Removing a resource from persistent storage failed.
    ///
    /// Never surfaced to the user; the store logs it and moves on.
    #[error("Failed to delete {uri}: {source} {location}")]
    DeleteFailed {
        /// Resource that could not be deleted.
        uri: String,
        /// Underlying platform failure.
        #[source]
        source: PlatformError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The upload collaborator rejected a post.
    #[error("Upload failed: {source} {location}")]
    UploadFailed {
        /// Underlying platform failure.
        #[source]
        source: PlatformError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl MediaError {
    /// Title and body of the one-shot notice shown to the user.
    pub fn user_notice(&self) -> (&'static str, &'static str) {
        match self {
            MediaError::PermissionDenied { capability, .. } if *capability == "photos" => {
                ("Permission", "Permission required for photos.")
            }
            MediaError::PermissionDenied { capability, .. } if *capability == "microphone" => {
                ("Permission", "Permission required for the microphone.")
            }
            MediaError::PermissionDenied { .. } => {
                ("Permission", "Permission required to access media.")
            }
            MediaError::RecordingFailed { operation, .. } if *operation == "stop" => {
                ("Error", "Failed to stop recording.")
            }
            MediaError::RecordingFailed { .. } | MediaError::RecordingActive { .. } => {
                ("Error", "Failed to start recording.")
            }
            MediaError::NotRecording { .. } => ("Error", "Failed to stop recording."),
            MediaError::LoadError { .. } => ("Error", "Failed to load sound file."),
            MediaError::PlaybackError { .. } | MediaError::InvalidState { .. } => {
                ("Error", "Failed to play audio.")
            }
            MediaError::InvalidParameter { .. } => ("Error", "Invalid edit value."),
            MediaError::NoAudioSelected { .. } | MediaError::HandleReplaced { .. } => {
                ("Error", "Select an audio file first.")
            }
            MediaError::DeleteFailed { .. } => ("Error", "Failed to delete file."),
            MediaError::UploadFailed { .. } => ("Error", "Failed to upload post."),
        }
    }
}

/// Result type alias using [`MediaError`].
pub type Result<T> = std::result::Result<T, MediaError>;
