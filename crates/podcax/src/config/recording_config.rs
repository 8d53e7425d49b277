use crate::config::default_extension;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Extension of recorded files. Only `wav` is supported by the host recorder.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// App-private directory where recordings are written.
    pub media_dir: PathBuf,
}
