use crate::{MediaUri, PlatformError};

use async_trait::async_trait;
use uuid::Uuid;

/// Answer to a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// The user allowed access.
    Granted,
    /// The user refused access.
    Denied,
}

/// Opaque token for an in-flight capture, issued by [`RecordingCapability::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureHandle(Uuid);

impl CaptureHandle {
    /// Mint a fresh capture token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CaptureHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Options passed to the recorder when a capture begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    /// File extension of the produced resource, without the dot.
    pub extension: String,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            extension: "m4a".to_string(),
        }
    }
}

/// Audio input capability.
#[async_trait]
pub trait RecordingCapability: Send + Sync {
    /// Ask for microphone access.
    async fn request_permission(&self) -> Permission;

    /// Begin capturing audio.
    async fn start(&self, options: &CaptureOptions) -> Result<CaptureHandle, PlatformError>;

    /// Finish a capture and return where the audio was written.
    ///
    /// On error the implementation must not leave a partial file behind.
    async fn stop(&self, capture: CaptureHandle) -> Result<MediaUri, PlatformError>;
}
