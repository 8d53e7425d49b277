//! WAV playback through a cpal output stream.
//!
//! The file is decoded up front with hound and mixed down to mono. The
//! output callback reads it at a fractional cursor so volume and rate can
//! change while playing. A tokio task reports position on a fixed interval
//! and emits the single completion tick.

use podcax_core::{
    LoadOptions, LoadedSound, MAX_RATE, MIN_RATE, MediaUri, PlatformError, PlaybackCapability,
    PlaybackStatus, Sound, StatusSink,
};

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use cpal::{
    Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

/// Plays WAV files on the default output device.
pub struct CpalPlayer {
    tick_interval: Duration,
}

impl CpalPlayer {
    /// Player reporting status every `tick_interval`.
    pub fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }
}

/// Mono PCM decoded from a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecodedAudio {
    pub(crate) samples: Vec<f32>,
    pub(crate) sample_rate: u32,
}

impl DecodedAudio {
    pub(crate) fn duration_millis(&self) -> u64 {
        frames_to_millis(self.samples.len() as f64, self.sample_rate)
    }
}

/// State shared between the output callback, the ticker and the sound.
pub(crate) struct Playhead {
    audio: DecodedAudio,
    output_rate: u32,
    /// Source frame index, `f64` bits.
    cursor: AtomicU64,
    /// `f32` bits.
    volume: AtomicU32,
    /// `f32` bits.
    rate: AtomicU32,
    playing: AtomicBool,
    finished: AtomicBool,
}

impl Playhead {
    pub(crate) fn new(audio: DecodedAudio, output_rate: u32, options: LoadOptions) -> Self {
        Self {
            audio,
            output_rate,
            cursor: AtomicU64::new(0f64.to_bits()),
            volume: AtomicU32::new(options.volume.to_bits()),
            rate: AtomicU32::new(options.rate.clamp(MIN_RATE, MAX_RATE).to_bits()),
            playing: AtomicBool::new(options.should_play),
            finished: AtomicBool::new(false),
        }
    }

    fn cursor(&self) -> f64 {
        f64::from_bits(self.cursor.load(Ordering::Acquire))
    }

    fn set_cursor(&self, frames: f64) {
        self.cursor.store(frames.to_bits(), Ordering::Release);
    }

    fn position_millis(&self) -> u64 {
        frames_to_millis(self.cursor(), self.audio.sample_rate)
            .min(self.audio.duration_millis())
    }

    fn seek_millis(&self, position_millis: u64) {
        let frames = position_millis as f64 * f64::from(self.audio.sample_rate) / 1000.0;
        self.set_cursor(frames.min(self.audio.samples.len() as f64));
    }

    fn status(&self) -> PlaybackStatus {
        PlaybackStatus::loaded(
            self.position_millis(),
            self.audio.duration_millis(),
            self.playing.load(Ordering::Acquire),
        )
    }

    /// Output callback body: fill `data` (interleaved, `channels` wide).
    pub(crate) fn render(&self, data: &mut [f32], channels: usize) {
        if !self.playing.load(Ordering::Acquire) {
            data.fill(0.0);
            return;
        }

        let volume = f32::from_bits(self.volume.load(Ordering::Acquire));
        let rate = f32::from_bits(self.rate.load(Ordering::Acquire));
        let step = f64::from(rate) * f64::from(self.audio.sample_rate)
            / f64::from(self.output_rate.max(1));

        let mut cursor = self.cursor();
        for frame in data.chunks_mut(channels.max(1)) {
            match self.audio.samples.get(cursor as usize) {
                Some(&sample) => {
                    frame.fill(sample * volume);
                    cursor += step;
                }
                None => {
                    frame.fill(0.0);
                    if self.playing.swap(false, Ordering::AcqRel) {
                        self.finished.store(true, Ordering::Release);
                    }
                }
            }
        }
        self.set_cursor(cursor);
    }
}

struct CpalSound {
    playhead: Arc<Playhead>,
    stream: Option<Stream>,
    ticker: Option<JoinHandle<()>>,
}

impl CpalSound {
    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for CpalSound {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

#[async_trait]
impl Sound for CpalSound {
    async fn play(&mut self) -> Result<(), PlatformError> {
        self.playhead.finished.store(false, Ordering::Release);
        self.playhead.playing.store(true, Ordering::Release);
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), PlatformError> {
        self.playhead.playing.store(false, Ordering::Release);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), PlatformError> {
        self.playhead.playing.store(false, Ordering::Release);
        self.playhead.set_cursor(0.0);
        Ok(())
    }

    async fn set_position(&mut self, position_millis: u64) -> Result<(), PlatformError> {
        self.playhead.seek_millis(position_millis);
        Ok(())
    }

    async fn set_volume(&mut self, volume: f32) -> Result<(), PlatformError> {
        self.playhead
            .volume
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Release);
        Ok(())
    }

    async fn set_rate(&mut self, rate: f32) -> Result<(), PlatformError> {
        self.playhead
            .rate
            .store(rate.clamp(MIN_RATE, MAX_RATE).to_bits(), Ordering::Release);
        Ok(())
    }

    async fn unload(&mut self) -> Result<(), PlatformError> {
        self.playhead.playing.store(false, Ordering::Release);
        self.stop_ticker();
        if let Some(stream) = self.stream.take() {
            drop(stream);
            debug!("Output stream released");
        }
        Ok(())
    }
}

#[async_trait]
impl PlaybackCapability for CpalPlayer {
    #[instrument(skip(self, sink))]
    async fn load(
        &self,
        uri: &MediaUri,
        options: LoadOptions,
        sink: StatusSink,
    ) -> Result<LoadedSound, PlatformError> {
        let path = PathBuf::from(uri.as_str());
        let audio = tokio::task::spawn_blocking(move || decode_wav(&path))
            .await
            .map_err(|e| PlatformError::new(format!("Decoder task failed: {}", e)))??;

        let (playhead, stream) = open_output(audio, options)?;
        let status = playhead.status();

        let ticker = tokio::spawn(report_status(
            Arc::clone(&playhead),
            sink,
            self.tick_interval,
        ));

        info!(
            uri = %uri,
            duration_ms = status.duration_millis,
            "Sound loaded"
        );

        Ok(LoadedSound {
            sound: Box::new(CpalSound {
                playhead,
                stream: Some(stream),
                ticker: Some(ticker),
            }),
            status,
        })
    }
}

fn open_output(
    audio: DecodedAudio,
    options: LoadOptions,
) -> Result<(Arc<Playhead>, Stream), PlatformError> {
    let host = cpal::default_host();

    let device = host
        .default_output_device()
        .ok_or_else(|| PlatformError::new("No audio output device found"))?;

    let config = device
        .default_output_config()
        .map_err(|e| PlatformError::new(format!("Failed to get output config: {}", e)))?;

    let channels = usize::from(config.channels());
    let stream_config: StreamConfig = config.into();
    let playhead = Arc::new(Playhead::new(audio, stream_config.sample_rate, options));
    let callback_playhead = Arc::clone(&playhead);

    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                callback_playhead.render(data, channels);
            },
            |err| {
                error!("Audio output stream error: {}", err);
            },
            None,
        )
        .map_err(|e| PlatformError::new(format!("Failed to build output stream: {}", e)))?;

    stream
        .play()
        .map_err(|e| PlatformError::new(format!("Failed to start output stream: {}", e)))?;

    debug!(
        device_id = ?device.id(),
        sample_rate = stream_config.sample_rate,
        channels,
        "Output stream opened"
    );

    Ok((playhead, stream))
}

/// Push a status tick whenever it changes, and the completion tick once.
async fn report_status(playhead: Arc<Playhead>, sink: StatusSink, tick_interval: Duration) {
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = None;

    loop {
        interval.tick().await;

        let status = if playhead.finished.swap(false, Ordering::AcqRel) {
            PlaybackStatus::finished(playhead.audio.duration_millis())
        } else {
            playhead.status()
        };

        if last == Some(status) {
            continue;
        }
        last = Some(status);

        if !sink.push(status) {
            debug!("Status receiver gone, stopping ticker");
            break;
        }
    }
}

/// Decode a WAV file and mix it down to mono.
pub(crate) fn decode_wav(path: &Path) -> Result<DecodedAudio, PlatformError> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| PlatformError::new(format!("Failed to open {}: {}", path.display(), e)))?;

    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| PlatformError::new(format!("Failed to read samples: {}", e)))?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << spec.bits_per_sample.saturating_sub(1).min(31)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(|e| PlatformError::new(format!("Failed to read samples: {}", e)))?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let samples: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    if samples.is_empty() {
        warn!(path = ?path, "WAV file has no samples");
    }

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate.max(1),
    })
}

fn frames_to_millis(frames: f64, sample_rate: u32) -> u64 {
    (frames * 1000.0 / f64::from(sample_rate.max(1))) as u64
}
