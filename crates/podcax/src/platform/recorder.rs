//! Microphone capture through cpal, finalized as a WAV file with hound.

use podcax_core::{
    CaptureHandle, CaptureOptions, MediaUri, Permission, PlatformError, RecordingCapability,
};

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use cpal::{
    Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Maximum samples to buffer (30 minutes at 48kHz mono).
/// Prevents unbounded memory growth during long recordings.
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 30;

struct ActiveCapture {
    handle: CaptureHandle,
    stream: Stream,
    samples: Arc<Mutex<Vec<f32>>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream so no in-flight callback writes after `stop()`
    /// takes the buffer.
    shutdown: Arc<AtomicBool>,
    sample_rate: u32,
    channels: u16,
    path: PathBuf,
}

/// Records from the default input device into the app media directory.
pub struct CpalRecorder {
    media_dir: PathBuf,
    active: Mutex<Option<ActiveCapture>>,
}

impl CpalRecorder {
    /// Recorder writing into `media_dir`, created on first capture.
    pub fn new(media_dir: impl Into<PathBuf>) -> Self {
        Self {
            media_dir: media_dir.into(),
            active: Mutex::new(None),
        }
    }

    fn active(&self) -> MutexGuard<'_, Option<ActiveCapture>> {
        self.active.lock().unwrap_or_else(|e| {
            error!("Capture lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn open_stream(&self, path: PathBuf) -> Result<ActiveCapture, PlatformError> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| PlatformError::new("No microphone found"))?;

        let config = device
            .default_input_config()
            .map_err(|e| PlatformError::new(format!("Failed to get config: {}", e)))?;

        let sample_rate = config.sample_rate();
        let channels = config.channels();
        let stream_config: StreamConfig = config.into();
        let samples = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let callback_samples = Arc::clone(&samples);
        let callback_shutdown = Arc::clone(&shutdown);

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if callback_shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    let mut buf = callback_samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    let room = MAX_BUFFER_SAMPLES.saturating_sub(buf.len());
                    buf.extend(data.iter().take(room).copied());
                },
                |err| {
                    error!("Audio input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| PlatformError::new(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| PlatformError::new(format!("Failed to start stream: {}", e)))?;

        info!(
            device_id = ?device.id(),
            sample_rate,
            channels,
            path = ?path,
            "Audio capture started"
        );

        Ok(ActiveCapture {
            handle: CaptureHandle::new(),
            stream,
            samples,
            shutdown,
            sample_rate,
            channels,
            path,
        })
    }
}

#[async_trait]
impl RecordingCapability for CpalRecorder {
    async fn request_permission(&self) -> Permission {
        match cpal::default_host().default_input_device() {
            Some(_) => Permission::Granted,
            None => {
                warn!("No input device available");
                Permission::Denied
            }
        }
    }

    #[instrument(skip(self))]
    async fn start(&self, options: &CaptureOptions) -> Result<CaptureHandle, PlatformError> {
        if self.active().is_some() {
            return Err(PlatformError::new("A capture is already running"));
        }

        tokio::fs::create_dir_all(&self.media_dir)
            .await
            .map_err(|e| PlatformError::new(format!("Failed to create media dir: {}", e)))?;

        let path = self.media_dir.join(format!(
            "capture-{}.{}",
            Uuid::new_v4(),
            options.extension.trim_start_matches('.')
        ));

        let capture = self.open_stream(path)?;
        let handle = capture.handle;

        let mut active = self.active();
        if active.is_some() {
            return Err(PlatformError::new("A capture is already running"));
        }
        *active = Some(capture);

        Ok(handle)
    }

    #[instrument(skip(self))]
    async fn stop(&self, capture: CaptureHandle) -> Result<MediaUri, PlatformError> {
        let active = {
            let mut guard = self.active();
            match guard.take() {
                Some(active) if active.handle == capture => active,
                other => {
                    *guard = other;
                    return Err(PlatformError::new("Unknown capture handle"));
                }
            }
        };

        active.shutdown.store(true, Ordering::Release);
        drop(active.stream);
        // Let any in-flight callback observe the shutdown flag.
        tokio::time::sleep(Duration::from_millis(5)).await;

        let samples = {
            let mut buf = active.samples.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *buf)
        };
        debug!(sample_count = samples.len(), "Captured audio samples");

        let path = active.path;
        let sample_rate = active.sample_rate;
        let channels = active.channels;
        let written = path.clone();

        tokio::task::spawn_blocking(move || write_wav(&written, &samples, sample_rate, channels))
            .await
            .map_err(|e| PlatformError::new(format!("WAV writer task failed: {}", e)))??;

        info!(path = ?path, "Audio capture stopped");

        Ok(MediaUri::new(path.display().to_string()))
    }
}

/// Write interleaved f32 samples as a float WAV. Removes the partial file on error.
pub(crate) fn write_wav(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<(), PlatformError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    if let Err(e) = write_samples(path, spec, samples) {
        if let Err(cleanup) = std::fs::remove_file(path) {
            warn!(path = ?path, error = %cleanup, "Failed to remove partial recording");
        }
        return Err(PlatformError::new(format!("Failed to write WAV: {}", e)));
    }

    Ok(())
}

fn write_samples(path: &Path, spec: hound::WavSpec, samples: &[f32]) -> Result<(), hound::Error> {
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}
