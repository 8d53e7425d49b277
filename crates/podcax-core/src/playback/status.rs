use tokio::sync::mpsc;

/// Snapshot pushed by the platform while a sound is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    /// False once the platform has lost or released the sound.
    pub is_loaded: bool,
    /// Current play head.
    pub position_millis: u64,
    /// Total length; 0 while unknown.
    pub duration_millis: u64,
    /// Whether output is running.
    pub is_playing: bool,
    /// Set on the single tick that reports natural completion.
    pub did_just_finish: bool,
}

impl PlaybackStatus {
    /// Status of a loaded sound.
    pub fn loaded(position_millis: u64, duration_millis: u64, is_playing: bool) -> Self {
        Self {
            is_loaded: true,
            position_millis,
            duration_millis,
            is_playing,
            did_just_finish: false,
        }
    }

    /// Completion tick for a sound of the given length.
    pub fn finished(duration_millis: u64) -> Self {
        Self {
            is_loaded: true,
            position_millis: duration_millis,
            duration_millis,
            is_playing: false,
            did_just_finish: true,
        }
    }

    /// Tick reporting that the platform no longer holds the sound.
    pub fn unloaded() -> Self {
        Self::default()
    }
}

/// Identity of one `load()` of a playback session.
///
/// Every load and every unload advances the epoch; ticks stamped with an
/// older epoch are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Epoch(u64);

impl Epoch {
    /// The epoch after this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A status update tagged with the epoch of the load that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTick {
    /// Load the tick belongs to.
    pub epoch: Epoch,
    /// Reported status.
    pub status: PlaybackStatus,
}

/// Write end of a session's status stream, handed to the platform on load.
#[derive(Debug, Clone)]
pub struct StatusSink {
    epoch: Epoch,
    tx: mpsc::UnboundedSender<StatusTick>,
}

impl StatusSink {
    pub(crate) fn new(epoch: Epoch, tx: mpsc::UnboundedSender<StatusTick>) -> Self {
        Self { epoch, tx }
    }

    /// Push a status update. Returns `false` once the session is gone.
    pub fn push(&self, status: PlaybackStatus) -> bool {
        self.tx
            .send(StatusTick {
                epoch: self.epoch,
                status,
            })
            .is_ok()
    }

    /// Epoch stamped on every tick from this sink.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
}
