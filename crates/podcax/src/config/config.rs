//! Configuration management for podcax.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, lazy validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{DEFAULT_EXTENSION, DraftConfig, OutboxConfig, PlaybackConfig, RecordingConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use podcax_core::CaptureOptions;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Audio capture settings.
    pub recording: RecordingConfig,
    /// Playback status settings.
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Post composer settings.
    #[serde(default)]
    pub draft: DraftConfig,
    /// Upload spool settings.
    pub outbox: OutboxConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    ///
    /// Note: This does NOT validate the values. Call `validate()` before
    /// wiring up the host capabilities.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Self::load_from(&config_dir.join("config.toml"), proj_dirs.data_dir())
    }

    /// Load configuration from `config_path`, writing defaults rooted at
    /// `data_dir` when the file does not exist yet.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path, data_dir: &Path) -> AppResult<Self> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to read config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let config = Self::parse(&contents)?;

            info!(config_path = ?config_path, "Configuration loaded");

            Ok(config)
        } else {
            info!("No config found, creating default");
            let config = Self::defaults_in(data_dir);
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    /// Parse a TOML document.
    #[track_caller]
    pub fn parse(contents: &str) -> AppResult<Self> {
        toml::from_str(contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Default configuration with all directories under `data_dir`.
    pub fn defaults_in(data_dir: &Path) -> Self {
        Config {
            recording: RecordingConfig {
                extension: DEFAULT_EXTENSION.to_string(),
                media_dir: data_dir.join("media"),
            },
            playback: PlaybackConfig::default(),
            draft: DraftConfig::default(),
            outbox: OutboxConfig {
                dir: data_dir.join("outbox"),
            },
        }
    }

    /// Check the values the host capabilities depend on.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate(&self) -> AppResult<()> {
        let extension = self.recording.extension.trim_start_matches('.');
        if !extension.eq_ignore_ascii_case(DEFAULT_EXTENSION) {
            return Err(AppError::ConfigError {
                reason: format!(
                    "Unsupported recording extension '{}'. The host recorder writes '{}' files.",
                    self.recording.extension, DEFAULT_EXTENSION
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.playback.tick_interval_ms == 0 {
            return Err(AppError::ConfigError {
                reason: "playback.tick_interval_ms must be greater than zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// Save configuration to `config_path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Interval between playback status ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.playback.tick_interval_ms)
    }

    /// Options for every new capture.
    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            extension: self
                .recording
                .extension
                .trim_start_matches('.')
                .to_string(),
        }
    }

    /// Locator prefix of app-owned media, as handed to the media store.
    pub fn private_root(&self) -> String {
        self.recording.media_dir.display().to_string()
    }

    /// Where recordings are written.
    pub fn media_dir(&self) -> PathBuf {
        self.recording.media_dir.clone()
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "podcax", "PodcaX").ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get project directories".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
