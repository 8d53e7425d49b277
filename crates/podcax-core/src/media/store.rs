use crate::{
    CoreResult, LoadOptions, MediaError, MediaHandle, MediaKind, PickOutcome, PlaybackCapability,
    PlaybackSession, PlaybackState, RecordingSession, RecordingState, StorageCapability,
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// What the preview card shows for the current audio handle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewState {
    /// Name of the selected audio, if any.
    pub display_name: Option<String>,
    /// Play head of the attached session, 0 when none.
    pub position_millis: u64,
    /// Length reported by the attached session, 0 when none.
    pub duration_millis: u64,
    /// Whether the attached session is playing.
    pub is_playing: bool,
}

/// Single owner of the current audio and image selection.
///
/// Holds at most one audio handle with at most one attached
/// [`PlaybackSession`], at most one image handle, and at most one
/// [`RecordingSession`]. Every path that drops an attached session unloads
/// it first.
///
/// # Thread Safety
///
/// The store is a single local actor; share it behind one async mutex or
/// keep it on one task.
pub struct MediaStore {
    storage: Arc<dyn StorageCapability>,
    private_root: String,
    audio: Option<MediaHandle>,
    playback: Option<PlaybackSession>,
    image: Option<MediaHandle>,
    recording: Option<RecordingSession>,
}

impl MediaStore {
    /// Create an empty store.
    ///
    /// Resources whose locator starts with `private_root` belong to the app
    /// and are removed from storage when their handle is deleted.
    pub fn new(storage: Arc<dyn StorageCapability>, private_root: impl Into<String>) -> Self {
        Self {
            storage,
            private_root: private_root.into(),
            audio: None,
            playback: None,
            image: None,
            recording: None,
        }
    }

    /// Currently selected audio.
    pub fn audio_handle(&self) -> Option<&MediaHandle> {
        self.audio.as_ref()
    }

    /// Currently selected cover image.
    pub fn image_handle(&self) -> Option<&MediaHandle> {
        self.image.as_ref()
    }

    /// Session attached to the current audio handle.
    pub fn playback(&self) -> Option<&PlaybackSession> {
        self.playback.as_ref()
    }

    /// Mutable access to the attached session.
    pub fn playback_mut(&mut self) -> Option<&mut PlaybackSession> {
        self.playback.as_mut()
    }

    /// Snapshot for the preview card.
    pub fn preview(&self) -> PreviewState {
        let display_name = self.audio.as_ref().map(|h| h.display_name().to_string());
        match &self.playback {
            Some(session) => PreviewState {
                display_name,
                position_millis: session.position_millis(),
                duration_millis: session.duration_millis(),
                is_playing: session.is_playing(),
            },
            None => PreviewState {
                display_name,
                ..PreviewState::default()
            },
        }
    }

    /// Replace the current audio handle, unloading any attached session
    /// before the old handle is dropped.
    #[instrument(skip(self, handle))]
    pub async fn set_audio_handle(&mut self, handle: Option<MediaHandle>) {
        self.release_playback().await;
        if let Some(new) = &handle {
            info!(id = %new.id(), name = %new.display_name(), "Audio selected");
        }
        self.audio = handle;
    }

    /// Replace the current cover image.
    #[instrument(skip(self, handle))]
    pub fn set_image_handle(&mut self, handle: Option<MediaHandle>) {
        if let Some(new) = &handle {
            info!(id = %new.id(), name = %new.display_name(), "Image selected");
        }
        self.image = handle;
    }

    /// Turn a picker result into the current handle of `kind`.
    ///
    /// Returns the new handle, or `None` when the user cancelled.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` when the user refused library access.
    #[instrument(skip(self, outcome))]
    pub async fn select_picked(
        &mut self,
        kind: MediaKind,
        outcome: PickOutcome,
    ) -> CoreResult<Option<MediaHandle>> {
        let picked = match outcome {
            PickOutcome::Picked(picked) => picked,
            PickOutcome::Cancelled => {
                debug!("Picker cancelled");
                return Ok(None);
            }
            PickOutcome::PermissionDenied => {
                return Err(MediaError::PermissionDenied {
                    capability: match kind {
                        MediaKind::Audio => "media library",
                        MediaKind::Image => "photos",
                    },
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let name = picked
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| kind.fallback_name());
        let handle = MediaHandle::new(kind, picked.uri, name);

        match kind {
            MediaKind::Audio => self.set_audio_handle(Some(handle.clone())).await,
            MediaKind::Image => self.set_image_handle(Some(handle.clone())),
        }

        Ok(Some(handle))
    }

    /// Remove the current audio handle.
    ///
    /// Unloads the attached session and clears the preview state. Resources
    /// under the app's private root are also deleted from storage; a failed
    /// delete is logged and otherwise ignored.
    #[instrument(skip(self))]
    pub async fn delete_audio_handle(&mut self) -> Option<MediaHandle> {
        self.release_playback().await;

        let handle = self.audio.take()?;
        info!(id = %handle.id(), name = %handle.display_name(), "Audio deleted");

        if handle.uri().is_within(&self.private_root) {
            if let Err(source) = self.storage.delete_resource(handle.uri()).await {
                let e = MediaError::DeleteFailed {
                    uri: handle.uri().to_string(),
                    source,
                    location: ErrorLocation::from(Location::caller()),
                };
                warn!(error = %e, "Leaving stray file behind");
            }
        } else {
            debug!(uri = %handle.uri(), "Not app-owned, keeping resource");
        }

        Some(handle)
    }

    /// Swap the current audio handle for `handle`, which must carry the same id.
    ///
    /// # Errors
    ///
    /// `HandleReplaced` when the current audio is a different handle (or none).
    #[instrument(skip(self, handle))]
    pub async fn replace_audio_handle(&mut self, handle: MediaHandle) -> CoreResult<()> {
        match &self.audio {
            Some(current) if current.id() == handle.id() => {}
            _ => {
                return Err(MediaError::HandleReplaced {
                    id: handle.id().to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
        self.set_audio_handle(Some(handle)).await;
        Ok(())
    }

    /// Unload and drop the session attached to the current audio, if any.
    #[instrument(skip(self))]
    pub async fn release_playback(&mut self) {
        if let Some(mut session) = self.playback.take() {
            session.unload().await;
            debug!(session_id = %session.id(), "Released playback session");
        }
    }

    /// Attach a fresh session to the current audio and load it.
    ///
    /// Any previously attached session is unloaded before the new one
    /// starts loading. A session whose load fails is unloaded and detached.
    ///
    /// # Errors
    ///
    /// `NoAudioSelected` without a current audio handle, or the load error.
    #[instrument(skip(self, capability, options))]
    pub async fn attach_playback(
        &mut self,
        capability: Arc<dyn PlaybackCapability>,
        options: LoadOptions,
    ) -> CoreResult<&mut PlaybackSession> {
        let uri = match &self.audio {
            Some(handle) => handle.uri().clone(),
            None => {
                return Err(MediaError::NoAudioSelected {
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        self.release_playback().await;

        let session = self.playback.insert(PlaybackSession::new(capability));
        if let Err(e) = session.load(&uri, options).await {
            self.release_playback().await;
            return Err(e);
        }

        self.attached()
    }

    /// Play/pause button of the preview card.
    ///
    /// Loads the current audio on first use, pauses while playing, resumes
    /// otherwise, and restarts a finished session from the beginning.
    #[instrument(skip(self, capability))]
    pub async fn toggle_preview(&mut self, capability: Arc<dyn PlaybackCapability>) -> CoreResult<()> {
        let state = self.playback.as_ref().map(PlaybackSession::state);

        match state {
            Some(PlaybackState::Playing) => self.attached()?.pause().await,
            Some(PlaybackState::Loaded | PlaybackState::Paused) => self.attached()?.play().await,
            Some(PlaybackState::Finished) => {
                let session = self.attached()?;
                session.reset().await?;
                session.play().await
            }
            _ => {
                let session = self.attach_playback(capability, LoadOptions::default()).await?;
                session.play().await
            }
        }
    }

    /// Scrub the preview to `target_millis`.
    ///
    /// # Errors
    ///
    /// `NoAudioSelected` when nothing is loaded, or the seek error.
    pub async fn seek_preview(&mut self, target_millis: i64) -> CoreResult<()> {
        self.attached()?.seek(target_millis).await
    }

    /// Whether a capture is running.
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// State of the active capture, `Idle` when there is none.
    pub fn recording_state(&self) -> RecordingState {
        self.recording
            .as_ref()
            .map(RecordingSession::state)
            .unwrap_or(RecordingState::Idle)
    }

    /// Start `session` and keep it as the one active capture.
    ///
    /// # Errors
    ///
    /// `RecordingActive` when a capture is already running, otherwise the
    /// session's start error (the session is then discarded).
    #[instrument(skip(self, session))]
    pub async fn start_recording(&mut self, mut session: RecordingSession) -> CoreResult<()> {
        if self.recording.is_some() {
            return Err(MediaError::RecordingActive {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        session.start().await?;
        self.recording = Some(session);
        Ok(())
    }

    /// Stop the active capture and return its new audio handle.
    ///
    /// The handle is not selected; pass it to
    /// [`set_audio_handle`](Self::set_audio_handle) to use it.
    ///
    /// # Errors
    ///
    /// `NotRecording` without an active capture, or the recorder's error.
    #[instrument(skip(self))]
    pub async fn stop_recording(&mut self) -> CoreResult<MediaHandle> {
        match self.recording.take() {
            Some(session) => session.stop().await,
            None => Err(MediaError::NotRecording {
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Clear audio and image, unloading playback.
    pub async fn clear_media(&mut self) {
        self.set_audio_handle(None).await;
        self.set_image_handle(None);
    }

    /// Release every platform resource the store holds.
    ///
    /// A running capture is finalized and its file deleted, since nothing
    /// will ever select it.
    #[instrument(skip(self))]
    pub async fn close(&mut self) {
        self.release_playback().await;

        if let Some(session) = self.recording.take() {
            match session.stop().await {
                Ok(handle) => {
                    if let Err(e) = self.storage.delete_resource(handle.uri()).await {
                        warn!(uri = %handle.uri(), error = %e, "Failed to discard unfinished recording");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to stop recording on close"),
            }
        }

        info!("Media store closed");
    }

    #[track_caller]
    fn attached(&mut self) -> CoreResult<&mut PlaybackSession> {
        self.playback
            .as_mut()
            .ok_or_else(|| MediaError::NoAudioSelected {
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
