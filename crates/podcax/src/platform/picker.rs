//! Path-based picker: the "dialog" is a path typed on the command line.

use podcax_core::{MediaUri, PickOutcome, PickedFile, PickerCapability, PlatformError};

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Resolves one typed path into a picker result.
///
/// A path that does not exist counts as a dismissed dialog. A path the
/// process may not read counts as refused library access.
#[derive(Debug, Clone)]
pub struct PathPicker {
    path: PathBuf,
}

impl PathPicker {
    /// Picker answering with `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[instrument(skip(self), fields(path = ?self.path))]
    async fn pick(&self) -> Result<PickOutcome, PlatformError> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No such file, treating as cancelled");
                return Ok(PickOutcome::Cancelled);
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                warn!("File not accessible");
                return Ok(PickOutcome::PermissionDenied);
            }
            Err(e) => return Err(PlatformError::new(format!("Failed to stat file: {}", e))),
        };

        if !metadata.is_file() {
            debug!("Not a regular file, treating as cancelled");
            return Ok(PickOutcome::Cancelled);
        }

        if let Err(e) = tokio::fs::File::open(&self.path).await {
            if e.kind() == ErrorKind::PermissionDenied {
                warn!("File not readable");
                return Ok(PickOutcome::PermissionDenied);
            }
            return Err(PlatformError::new(format!("Failed to open file: {}", e)));
        }

        let uri = tokio::fs::canonicalize(&self.path)
            .await
            .unwrap_or_else(|_| self.path.clone());

        Ok(PickOutcome::Picked(PickedFile {
            uri: MediaUri::new(uri.display().to_string()),
            name: self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
        }))
    }
}

#[async_trait]
impl PickerCapability for PathPicker {
    async fn pick_audio(&self) -> Result<PickOutcome, PlatformError> {
        self.pick().await
    }

    async fn pick_image(&self) -> Result<PickOutcome, PlatformError> {
        self.pick().await
    }
}
