mod draft_config;
#[allow(clippy::module_inception)]
mod config;
mod outbox_config;
mod playback_config;
mod recording_config;

pub(crate) use {
    config::Config, draft_config::DraftConfig, outbox_config::OutboxConfig,
    playback_config::PlaybackConfig, recording_config::RecordingConfig,
};

pub(crate) const DEFAULT_EXTENSION: &str = "wav";
pub(crate) const DEFAULT_TICK_INTERVAL_MS: u64 = 250;

pub(crate) fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

pub(crate) fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}
