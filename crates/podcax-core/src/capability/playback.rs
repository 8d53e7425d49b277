use crate::{MediaUri, PlatformError, PlaybackStatus, StatusSink};

use async_trait::async_trait;

/// Initial settings for a freshly loaded sound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Start playing as soon as the sound is loaded.
    pub should_play: bool,
    /// Initial volume in `[0, 1]`.
    pub volume: f32,
    /// Initial rate in `[0.5, 2.0]`.
    pub rate: f32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            should_play: false,
            volume: 1.0,
            rate: 1.0,
        }
    }
}

/// A platform sound together with the status it reported on load.
pub struct LoadedSound {
    /// The loaded sound.
    pub sound: Box<dyn Sound>,
    /// Status at the moment loading completed.
    pub status: PlaybackStatus,
}

/// Audio output capability.
#[async_trait]
pub trait PlaybackCapability: Send + Sync {
    /// Open `uri` for playback.
    ///
    /// Status updates for the sound must be pushed through `sink` until
    /// [`Sound::unload`] completes.
    async fn load(
        &self,
        uri: &MediaUri,
        options: LoadOptions,
        sink: StatusSink,
    ) -> Result<LoadedSound, PlatformError>;
}

/// One loaded platform sound.
#[async_trait]
pub trait Sound: Send {
    /// Start or resume output.
    async fn play(&mut self) -> Result<(), PlatformError>;

    /// Pause output, keeping the position.
    async fn pause(&mut self) -> Result<(), PlatformError>;

    /// Stop output.
    async fn stop(&mut self) -> Result<(), PlatformError>;

    /// Move the play head.
    async fn set_position(&mut self, position_millis: u64) -> Result<(), PlatformError>;

    /// Change the output volume.
    async fn set_volume(&mut self, volume: f32) -> Result<(), PlatformError>;

    /// Change the playback rate. Whether pitch follows is up to the platform.
    async fn set_rate(&mut self, rate: f32) -> Result<(), PlatformError>;

    /// Release the underlying resource. No status may be pushed afterwards.
    async fn unload(&mut self) -> Result<(), PlatformError>;
}
