//! Spools submitted posts into an outbox directory, one TOML manifest each.

use podcax_core::{PlatformError, PostSubmission, UploadCapability};

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

/// On-disk form of a spooled post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostManifest {
    /// Manifest id, also the file stem.
    pub id: Uuid,
    /// When the post was handed off.
    pub created_at: DateTime<Utc>,
    /// Audio locator.
    pub audio: String,
    /// Cover image locator.
    pub image: String,
    /// Post text.
    pub description: String,
}

impl PostManifest {
    fn from_post(post: &PostSubmission) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            audio: post.audio_uri.to_string(),
            image: post.image_uri.to_string(),
            description: post.description.clone(),
        }
    }
}

/// Upload collaborator writing into a local outbox.
#[derive(Debug, Clone)]
pub struct OutboxUploader {
    dir: PathBuf,
}

impl OutboxUploader {
    /// Uploader spooling into `dir`, created on first post.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl UploadCapability for OutboxUploader {
    #[instrument(skip(self, post), fields(dir = ?self.dir))]
    async fn submit_post(&self, post: &PostSubmission) -> Result<(), PlatformError> {
        let manifest = PostManifest::from_post(post);
        let contents = toml::to_string_pretty(&manifest)
            .map_err(|e| PlatformError::new(format!("Failed to serialize post: {}", e)))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PlatformError::new(format!("Failed to create outbox: {}", e)))?;

        // Readers must never see a half-written manifest.
        let path = self.dir.join(format!("post-{}.toml", manifest.id));
        let temp_path = path.with_extension("toml.tmp");

        tokio::fs::write(&temp_path, contents)
            .await
            .map_err(|e| PlatformError::new(format!("Failed to write post: {}", e)))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| PlatformError::new(format!("Failed to publish post: {}", e)))?;

        info!(path = ?path, "Post spooled");
        Ok(())
    }
}
