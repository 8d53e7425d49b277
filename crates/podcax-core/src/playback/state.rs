/// Lifecycle of a [`PlaybackSession`](crate::PlaybackSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No platform sound is held.
    Unloaded,
    /// A load is in flight.
    Loading,
    /// Loaded and stopped at some position.
    Loaded,
    /// Audio is being output.
    Playing,
    /// Output paused, position kept.
    Paused,
    /// Reached the end; position already rewound to 0.
    Finished,
    /// A platform call failed. Needs `reset()` or a reload.
    Error,
}

impl PlaybackState {
    /// Whether a platform sound is loaded and accepts volume/rate changes.
    pub fn is_loaded(self) -> bool {
        matches!(
            self,
            PlaybackState::Loaded
                | PlaybackState::Playing
                | PlaybackState::Paused
                | PlaybackState::Finished
        )
    }

    /// Whether `seek()` is accepted.
    pub fn is_seekable(self) -> bool {
        matches!(
            self,
            PlaybackState::Loaded | PlaybackState::Playing | PlaybackState::Paused
        )
    }
}
