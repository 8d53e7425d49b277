use podcax_core::{MediaUri, PlatformError, StorageCapability};

use std::io::ErrorKind;

use async_trait::async_trait;
use tracing::{debug, instrument};

/// Deletes app-owned files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

#[async_trait]
impl StorageCapability for FsStorage {
    #[instrument(skip(self))]
    async fn delete_resource(&self, uri: &MediaUri) -> Result<(), PlatformError> {
        match tokio::fs::remove_file(uri.as_str()).await {
            Ok(()) => {
                debug!("File deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("File already gone");
                Ok(())
            }
            Err(e) => Err(PlatformError::new(format!("Failed to delete file: {}", e))),
        }
    }
}
