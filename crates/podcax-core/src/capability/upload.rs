use crate::{MediaUri, PlatformError};

use async_trait::async_trait;

/// The three fields of a post handed to the upload collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSubmission {
    /// Audio to publish.
    pub audio_uri: MediaUri,
    /// Cover image.
    pub image_uri: MediaUri,
    /// Post text.
    pub description: String,
}

/// Remote post publishing.
#[async_trait]
pub trait UploadCapability: Send + Sync {
    /// Publish a post.
    async fn submit_post(&self, post: &PostSubmission) -> Result<(), PlatformError>;
}
