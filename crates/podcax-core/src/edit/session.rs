use crate::{
    CoreResult, EditParams, LoadOptions, MediaError, MediaHandle, MediaId, MediaStore,
    PlaybackCapability, PlaybackSession, PlaybackState, edit::edited_name,
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{info, instrument};

/// The audio editor: live volume/speed preview of the selected audio.
///
/// Owns its own [`PlaybackSession`]; the store's preview session is
/// released when the editor opens. Both [`save`](Self::save) and
/// [`cancel`](Self::cancel) consume the editor and unload its session.
pub struct EditSession {
    target: MediaHandle,
    playback: PlaybackSession,
    committed: bool,
}

impl EditSession {
    /// Open the editor on the store's current audio.
    ///
    /// The sound is loaded paused with volume 1.0 and rate 1.0.
    ///
    /// # Errors
    ///
    /// `NoAudioSelected` without current audio, or the load error.
    #[instrument(skip(store, capability))]
    pub async fn open(
        store: &mut MediaStore,
        capability: Arc<dyn PlaybackCapability>,
    ) -> CoreResult<Self> {
        let target = match store.audio_handle() {
            Some(handle) => handle.clone(),
            None => {
                return Err(MediaError::NoAudioSelected {
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        store.release_playback().await;

        let mut playback = PlaybackSession::new(capability);
        if let Err(e) = playback.load(target.uri(), LoadOptions::default()).await {
            playback.unload().await;
            return Err(e);
        }

        info!(
            target_id = %target.id(),
            session_id = %playback.id(),
            "Editor opened"
        );

        Ok(Self {
            target,
            playback,
            committed: false,
        })
    }

    /// Id of the handle being edited.
    pub fn target_handle_id(&self) -> MediaId {
        self.target.id()
    }

    /// Handle being edited, as it was when the editor opened.
    pub fn target(&self) -> &MediaHandle {
        &self.target
    }

    /// Volume chosen so far.
    pub fn volume(&self) -> f32 {
        self.playback.volume()
    }

    /// Rate chosen so far.
    pub fn rate(&self) -> f32 {
        self.playback.rate()
    }

    /// Whether the edit was saved.
    pub fn committed(&self) -> bool {
        self.committed
    }

    /// The wrapped session.
    pub fn playback(&self) -> &PlaybackSession {
        &self.playback
    }

    /// Mutable access to the wrapped session, for status pumping.
    pub fn playback_mut(&mut self) -> &mut PlaybackSession {
        &mut self.playback
    }

    /// Volume slider moved.
    pub async fn adjust_volume(&mut self, volume: f32) -> CoreResult<()> {
        self.playback.set_volume(volume).await
    }

    /// Speed slider moved.
    pub async fn adjust_speed(&mut self, rate: f32) -> CoreResult<()> {
        self.playback.set_rate(rate).await
    }

    /// Play/pause button. A finished preview restarts from the beginning.
    #[instrument(skip(self))]
    pub async fn toggle_playback(&mut self) -> CoreResult<()> {
        match self.playback.state() {
            PlaybackState::Playing => self.playback.pause().await,
            PlaybackState::Finished => {
                self.playback.reset().await?;
                self.playback.play().await
            }
            _ => self.playback.play().await,
        }
    }

    /// Commit: replace the target in `store` with a renamed copy that keeps
    /// its locator and records the chosen volume and rate.
    ///
    /// # Errors
    ///
    /// `HandleReplaced` if the store no longer holds the target.
    #[instrument(skip(self, store), fields(target_id = %self.target.id()))]
    pub async fn save(mut self, store: &mut MediaStore) -> CoreResult<MediaHandle> {
        let params = EditParams {
            volume: self.playback.volume(),
            rate: self.playback.rate(),
        };
        self.playback.unload().await;

        let renamed = self
            .target
            .renamed(edited_name(self.target.display_name()), params);
        store.replace_audio_handle(renamed.clone()).await?;
        self.committed = true;

        info!(
            name = %renamed.display_name(),
            volume = params.volume,
            rate = params.rate,
            "Edit saved"
        );

        Ok(renamed)
    }

    /// Discard: unload the preview and leave the store untouched.
    #[instrument(skip(self), fields(target_id = %self.target.id()))]
    pub async fn cancel(mut self) {
        self.playback.unload().await;
        info!("Edit cancelled");
    }
}
