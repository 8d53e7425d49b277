use crate::{
    CaptureOptions, CoreResult, MediaError, MediaHandle, Permission, RecordingCapability,
    RecordingState,
};

use std::{panic::Location, sync::Arc};

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// One audio capture, from permission prompt to finished file.
///
/// A session is single use: [`stop`](Self::stop) consumes it and turns it
/// into a [`MediaHandle`], whether or not the platform succeeds.
pub struct RecordingSession {
    id: Uuid,
    capability: Arc<dyn RecordingCapability>,
    options: CaptureOptions,
    state: RecordingState,
}

impl RecordingSession {
    /// Create an idle session.
    pub fn new(capability: Arc<dyn RecordingCapability>, options: CaptureOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            capability,
            options,
            state: RecordingState::Idle,
        }
    }

    /// Session id for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// When the capture began, while recording.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            RecordingState::Recording { started_at, .. } => Some(started_at),
            _ => None,
        }
    }

    /// Ask for the microphone and begin capturing.
    ///
    /// # Errors
    ///
    /// - `RecordingActive` unless the session is `Idle`.
    /// - `PermissionDenied` if the user refuses; the session stays `Idle`.
    /// - `RecordingFailed` if the recorder cannot start; the session returns
    ///   to `Idle`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn start(&mut self) -> CoreResult<()> {
        if self.state != RecordingState::Idle {
            return Err(MediaError::RecordingActive {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.state = RecordingState::Armed;

        if self.capability.request_permission().await == Permission::Denied {
            self.state = RecordingState::Idle;
            warn!("Microphone permission denied");
            return Err(MediaError::PermissionDenied {
                capability: "microphone",
                location: ErrorLocation::from(Location::caller()),
            });
        }

        match self.capability.start(&self.options).await {
            Ok(capture) => {
                self.state = RecordingState::Recording {
                    started_at: Utc::now(),
                    capture,
                };
                info!("Recording started");
                Ok(())
            }
            Err(source) => {
                self.state = RecordingState::Idle;
                error!(error = %source, "Failed to start recording");
                Err(MediaError::RecordingFailed {
                    operation: "start",
                    source,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Finalize the capture and produce an audio handle named
    /// `recording-<millis>.<ext>`.
    ///
    /// # Errors
    ///
    /// - `NotRecording` if the session never reached `Recording`.
    /// - `RecordingFailed` if the recorder cannot finalize the file.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn stop(mut self) -> CoreResult<MediaHandle> {
        let (started_at, capture) = match self.state {
            RecordingState::Recording {
                started_at,
                capture,
            } => (started_at, capture),
            _ => {
                return Err(MediaError::NotRecording {
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        match self.capability.stop(capture).await {
            Ok(uri) => {
                self.state = RecordingState::Stopped;
                let stopped_at = Utc::now();
                let name = recording_name(stopped_at, &self.options.extension);
                let duration = stopped_at.signed_duration_since(started_at);
                info!(
                    uri = %uri,
                    name = %name,
                    duration_ms = duration.num_milliseconds(),
                    "Recording stopped"
                );
                Ok(MediaHandle::audio(uri, name))
            }
            Err(source) => {
                self.state = RecordingState::Idle;
                error!(error = %source, "Failed to stop recording");
                Err(MediaError::RecordingFailed {
                    operation: "stop",
                    source,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        if matches!(self.state, RecordingState::Recording { .. }) {
            warn!(session_id = %self.id, "Recording session dropped while capturing");
        }
    }
}

/// `recording-<millis>.<ext>`
pub(crate) fn recording_name(at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "recording-{}.{}",
        at.timestamp_millis(),
        extension.trim_start_matches('.')
    )
}
