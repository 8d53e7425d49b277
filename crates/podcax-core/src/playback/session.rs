use crate::{
    CoreResult, Epoch, LoadOptions, MediaError, MediaUri, PlaybackCapability, PlaybackState,
    PlaybackStatus, PlatformError, Sound, StatusSink, StatusTick,
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Lowest accepted volume.
pub const MIN_VOLUME: f32 = 0.0;
/// Highest accepted volume.
pub const MAX_VOLUME: f32 = 1.0;
/// Slowest accepted playback rate.
pub const MIN_RATE: f32 = 0.5;
/// Fastest accepted playback rate.
pub const MAX_RATE: f32 = 2.0;

/// State machine around one platform sound.
///
/// The session is the only writer of its position, duration and state.
/// Platform status arrives through a [`StatusSink`] handed out on each
/// `load()`; the session applies it in [`next_status`](Self::next_status) or
/// [`drain_status`](Self::drain_status), dropping ticks from older loads.
///
/// # Cancellation
///
/// Dropping a `load()` future leaves the session in `Loading`. Call
/// [`unload`](Self::unload) afterwards; it always returns the session to
/// `Unloaded`.
pub struct PlaybackSession {
    id: Uuid,
    capability: Arc<dyn PlaybackCapability>,
    sound: Option<Box<dyn Sound>>,
    state: PlaybackState,
    position_millis: u64,
    duration_millis: u64,
    volume: f32,
    rate: f32,
    epoch: Epoch,
    status_tx: mpsc::UnboundedSender<StatusTick>,
    status_rx: mpsc::UnboundedReceiver<StatusTick>,
}

impl PlaybackSession {
    /// Create an unloaded session backed by `capability`.
    pub fn new(capability: Arc<dyn PlaybackCapability>) -> Self {
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        Self {
            id: Uuid::new_v4(),
            capability,
            sound: None,
            state: PlaybackState::Unloaded,
            position_millis: 0,
            duration_millis: 0,
            volume: 1.0,
            rate: 1.0,
            epoch: Epoch::default(),
            status_tx,
            status_rx,
        }
    }

    /// Session id for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current play head.
    pub fn position_millis(&self) -> u64 {
        self.position_millis
    }

    /// Length of the loaded sound, 0 while unknown.
    pub fn duration_millis(&self) -> u64 {
        self.duration_millis
    }

    /// Current volume.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Current rate.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Whether audio is being output.
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Epoch of the current load.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Open `uri`. Valid from `Unloaded` or `Error`.
    ///
    /// # Errors
    ///
    /// `LoadError` if the platform cannot open the resource; the session is
    /// then left in `Error`.
    #[instrument(skip(self, options), fields(session_id = %self.id))]
    pub async fn load(&mut self, uri: &MediaUri, options: LoadOptions) -> CoreResult<()> {
        match self.state {
            PlaybackState::Unloaded | PlaybackState::Error => {}
            state => return Err(invalid_state("load", state)),
        }

        let volume = checked("volume", options.volume, MIN_VOLUME, MAX_VOLUME)?;
        let rate = checked("rate", options.rate, MIN_RATE, MAX_RATE)?;

        // A failed session may still hold its sound.
        self.release_sound().await;

        self.epoch = self.epoch.next();
        self.state = PlaybackState::Loading;
        self.position_millis = 0;
        self.duration_millis = 0;
        self.volume = volume;
        self.rate = rate;

        let sink = StatusSink::new(self.epoch, self.status_tx.clone());
        let options = LoadOptions {
            volume,
            rate,
            ..options
        };

        match self.capability.load(uri, options, sink).await {
            Ok(loaded) => {
                self.sound = Some(loaded.sound);
                self.duration_millis = loaded.status.duration_millis;
                self.position_millis = self.clamp_position(loaded.status.position_millis);
                self.state = if loaded.status.is_playing {
                    PlaybackState::Playing
                } else {
                    PlaybackState::Loaded
                };
                info!(
                    uri = %uri,
                    duration_ms = self.duration_millis,
                    "Sound loaded"
                );
                Ok(())
            }
            Err(source) => {
                self.state = PlaybackState::Error;
                error!(uri = %uri, error = %source, "Failed to load sound");
                Err(MediaError::LoadError {
                    uri: uri.to_string(),
                    source,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Start or resume output. Valid from `Loaded` or `Paused`; a no-op
    /// while already `Playing`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn play(&mut self) -> CoreResult<()> {
        match self.state {
            PlaybackState::Playing => return Ok(()),
            PlaybackState::Loaded | PlaybackState::Paused => {}
            state => return Err(invalid_state("play", state)),
        }

        let result = match self.sound.as_mut() {
            Some(sound) => sound.play().await,
            None => return Err(invalid_state("play", self.state)),
        };
        self.check(result)?;

        self.state = PlaybackState::Playing;
        debug!(position_ms = self.position_millis, "Playback started");
        Ok(())
    }

    /// Pause output. Valid from `Playing`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn pause(&mut self) -> CoreResult<()> {
        if self.state != PlaybackState::Playing {
            return Err(invalid_state("pause", self.state));
        }

        let result = match self.sound.as_mut() {
            Some(sound) => sound.pause().await,
            None => return Err(invalid_state("pause", self.state)),
        };
        self.check(result)?;

        self.state = PlaybackState::Paused;
        debug!(position_ms = self.position_millis, "Playback paused");
        Ok(())
    }

    /// Stop output and rewind to the start. Valid from `Loaded`, `Playing`
    /// or `Paused`; leaves the session `Loaded`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn stop(&mut self) -> CoreResult<()> {
        if !self.state.is_seekable() {
            return Err(invalid_state("stop", self.state));
        }

        let result = match self.sound.as_mut() {
            Some(sound) => match sound.stop().await {
                Ok(()) => sound.set_position(0).await,
                Err(e) => Err(e),
            },
            None => return Err(invalid_state("stop", self.state)),
        };
        self.check(result)?;

        self.state = PlaybackState::Loaded;
        self.position_millis = 0;
        Ok(())
    }

    /// Move the play head to `target_millis`, clamped to `[0, duration]`.
    ///
    /// Valid from `Loaded`, `Playing` or `Paused`; the play/pause state is
    /// unchanged.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn seek(&mut self, target_millis: i64) -> CoreResult<()> {
        if !self.state.is_seekable() {
            return Err(invalid_state("seek", self.state));
        }

        let position = u64::try_from(target_millis.max(0))
            .unwrap_or(0)
            .min(self.duration_millis);

        let result = match self.sound.as_mut() {
            Some(sound) => sound.set_position(position).await,
            None => return Err(invalid_state("seek", self.state)),
        };
        self.check(result)?;

        self.position_millis = position;
        debug!(position_ms = position, "Seeked");
        Ok(())
    }

    /// Change the volume, clamped to `[0, 1]`. Valid in any loaded state.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn set_volume(&mut self, volume: f32) -> CoreResult<()> {
        if !self.state.is_loaded() {
            return Err(invalid_state("set volume", self.state));
        }
        let volume = checked("volume", volume, MIN_VOLUME, MAX_VOLUME)?;

        let result = match self.sound.as_mut() {
            Some(sound) => sound.set_volume(volume).await,
            None => return Err(invalid_state("set volume", self.state)),
        };
        self.check(result)?;

        self.volume = volume;
        Ok(())
    }

    /// Change the rate, clamped to `[0.5, 2.0]`. Valid in any loaded state.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn set_rate(&mut self, rate: f32) -> CoreResult<()> {
        if !self.state.is_loaded() {
            return Err(invalid_state("set rate", self.state));
        }
        let rate = checked("rate", rate, MIN_RATE, MAX_RATE)?;

        let result = match self.sound.as_mut() {
            Some(sound) => sound.set_rate(rate).await,
            None => return Err(invalid_state("set rate", self.state)),
        };
        self.check(result)?;

        self.rate = rate;
        Ok(())
    }

    /// Leave `Finished` (back to `Loaded` at 0) or `Error` (back to
    /// `Unloaded`, releasing the sound).
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn reset(&mut self) -> CoreResult<()> {
        match self.state {
            PlaybackState::Finished => {
                self.state = PlaybackState::Loaded;
                self.position_millis = 0;
                Ok(())
            }
            PlaybackState::Error => {
                self.unload().await;
                Ok(())
            }
            state => Err(invalid_state("reset", state)),
        }
    }

    /// Release the platform sound. Valid from any state; always ends in
    /// `Unloaded`.
    ///
    /// The epoch is advanced before the platform call is awaited, so no
    /// tick from the released sound is applied afterwards.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn unload(&mut self) {
        self.epoch = self.epoch.next();
        self.release_sound().await;

        while self.status_rx.try_recv().is_ok() {}

        self.state = PlaybackState::Unloaded;
        self.position_millis = 0;
        self.duration_millis = 0;
        debug!("Playback session unloaded");
    }

    /// Wait for the next status tick of the current load and apply it.
    ///
    /// Stale ticks are skipped. Never resolves while nothing is loaded, so
    /// it is meant to sit in a `select!` next to other event sources.
    pub async fn next_status(&mut self) -> Option<PlaybackStatus> {
        loop {
            let tick = self.status_rx.recv().await?;
            if self.apply(tick).await {
                return Some(tick.status);
            }
        }
    }

    /// Apply every tick already queued. Returns how many were applied.
    pub async fn drain_status(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(tick) = self.status_rx.try_recv() {
            if self.apply(tick).await {
                applied += 1;
            }
        }
        applied
    }

    async fn apply(&mut self, tick: StatusTick) -> bool {
        if tick.epoch != self.epoch {
            debug!(
                session_id = %self.id,
                tick_epoch = ?tick.epoch,
                current_epoch = ?self.epoch,
                "Dropping stale status tick"
            );
            return false;
        }

        if matches!(self.state, PlaybackState::Unloaded | PlaybackState::Error) {
            return false;
        }

        let status = tick.status;

        if !status.is_loaded {
            warn!(session_id = %self.id, "Platform reported the sound as unloaded");
            self.state = PlaybackState::Error;
            self.position_millis = 0;
            self.duration_millis = 0;
            return true;
        }

        if status.duration_millis > 0 {
            self.duration_millis = status.duration_millis;
        }

        if status.did_just_finish {
            if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
                self.finish().await;
            }
            return true;
        }

        if self.state != PlaybackState::Finished {
            self.position_millis = self.clamp_position(status.position_millis);
        }
        true
    }

    async fn finish(&mut self) {
        self.state = PlaybackState::Finished;
        self.position_millis = 0;

        if let Some(sound) = self.sound.as_mut() {
            if let Err(e) = sound.set_position(0).await {
                warn!(session_id = %self.id, error = %e, "Failed to rewind finished sound");
            }
            if let Err(e) = sound.stop().await {
                warn!(session_id = %self.id, error = %e, "Failed to stop finished sound");
            }
        }

        info!(session_id = %self.id, "Playback finished");
    }

    async fn release_sound(&mut self) {
        if let Some(mut sound) = self.sound.take() {
            if let Err(e) = sound.unload().await {
                warn!(session_id = %self.id, error = %e, "Failed to unload sound");
            }
        }
    }

    fn clamp_position(&self, position_millis: u64) -> u64 {
        if self.duration_millis > 0 {
            position_millis.min(self.duration_millis)
        } else {
            position_millis
        }
    }

    #[track_caller]
    fn check(&mut self, result: Result<(), PlatformError>) -> CoreResult<()> {
        result.map_err(|source| {
            error!(session_id = %self.id, error = %source, state = ?self.state, "Platform playback call failed");
            self.state = PlaybackState::Error;
            MediaError::PlaybackError {
                source,
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if self.sound.is_some() {
            warn!(
                session_id = %self.id,
                state = ?self.state,
                "Playback session dropped without unload, platform sound leaked"
            );
        }
    }
}

#[track_caller]
fn invalid_state(operation: &'static str, state: PlaybackState) -> MediaError {
    MediaError::InvalidState {
        operation,
        state,
        location: ErrorLocation::from(Location::caller()),
    }
}

#[track_caller]
fn checked(parameter: &'static str, value: f32, min: f32, max: f32) -> CoreResult<f32> {
    if value.is_nan() {
        return Err(MediaError::InvalidParameter {
            parameter,
            value,
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(value.clamp(min, max))
}
