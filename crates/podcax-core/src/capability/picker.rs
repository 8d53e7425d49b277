use crate::{MediaUri, PlatformError};

use async_trait::async_trait;

/// A file chosen in a picker dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    /// Where the file can be read.
    pub uri: MediaUri,
    /// Name reported by the picker, when it has one.
    pub name: Option<String>,
}

/// Result of showing a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// The user chose a file.
    Picked(PickedFile),
    /// The user dismissed the dialog.
    Cancelled,
    /// The user refused access to the library.
    PermissionDenied,
}

/// File selection dialogs.
#[async_trait]
pub trait PickerCapability: Send + Sync {
    /// Let the user choose an audio file.
    async fn pick_audio(&self) -> Result<PickOutcome, PlatformError>;

    /// Let the user choose a cover image.
    async fn pick_image(&self) -> Result<PickOutcome, PlatformError>;
}
