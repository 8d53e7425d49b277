use crate::{MediaUri, PlatformError};

use async_trait::async_trait;

/// Persistent storage owned by the app.
#[async_trait]
pub trait StorageCapability: Send + Sync {
    /// Delete the resource at `uri`.
    ///
    /// Idempotent: deleting a resource that does not exist succeeds.
    async fn delete_resource(&self, uri: &MediaUri) -> Result<(), PlatformError>;
}
