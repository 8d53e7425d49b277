use crate::CaptureHandle;

use chrono::{DateTime, Utc};

/// Recording state for a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// Not currently recording.
    Idle,
    /// Waiting on the microphone permission and the recorder to start.
    Armed,
    /// Currently recording audio.
    Recording {
        /// When recording started.
        started_at: DateTime<Utc>,
        /// Platform token of the running capture.
        capture: CaptureHandle,
    },
    /// Capture finalized; the session has produced its handle.
    Stopped,
}
