use std::fmt;

use chrono::Utc;
use uuid::Uuid;

/// Opaque, immutable identifier of a media handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaId(Uuid);

impl MediaId {
    /// Mint a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Resource locator, local path or remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaUri(String);

impl MediaUri {
    /// Wrap a locator string.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Borrow the locator.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this locator lives under `root`.
    ///
    /// Matches whole path components only: `<root>-backup/x` is not under
    /// `<root>`.
    pub fn is_within(&self, root: &str) -> bool {
        if root.is_empty() {
            return false;
        }
        match self.0.strip_prefix(root) {
            Some(rest) => {
                rest.is_empty() || root.ends_with(is_separator) || rest.starts_with(is_separator)
            }
            None => false,
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

impl fmt::Display for MediaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MediaUri {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// What a handle points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Recorded or picked audio.
    Audio,
    /// Cover image.
    Image,
}

impl MediaKind {
    /// Name used when the picker cannot tell us one: `audio-<millis>.mp3`
    /// or `image-<millis>.jpg`.
    pub fn fallback_name(self) -> String {
        let millis = Utc::now().timestamp_millis();
        match self {
            MediaKind::Audio => format!("audio-{}.mp3", millis),
            MediaKind::Image => format!("image-{}.jpg", millis),
        }
    }
}

/// Volume and speed chosen in the editor, kept alongside the unchanged audio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditParams {
    /// Playback volume in `[0, 1]`.
    pub volume: f32,
    /// Playback rate in `[0.5, 2.0]`.
    pub rate: f32,
}

/// App-level reference to an audio or image resource plus display metadata.
///
/// Handles are never mutated in place: replacing the locator or the name
/// builds a new value through [`MediaHandle::renamed`].
#[derive(Debug, Clone, PartialEq)]
pub struct MediaHandle {
    id: MediaId,
    uri: MediaUri,
    display_name: String,
    kind: MediaKind,
    edit: Option<EditParams>,
}

impl MediaHandle {
    /// Create a handle with a fresh id.
    pub fn new(kind: MediaKind, uri: impl Into<MediaUri>, display_name: impl Into<String>) -> Self {
        Self {
            id: MediaId::new(),
            uri: uri.into(),
            display_name: display_name.into(),
            kind,
            edit: None,
        }
    }

    /// Shorthand for an audio handle.
    pub fn audio(uri: impl Into<MediaUri>, display_name: impl Into<String>) -> Self {
        Self::new(MediaKind::Audio, uri, display_name)
    }

    /// Shorthand for an image handle.
    pub fn image(uri: impl Into<MediaUri>, display_name: impl Into<String>) -> Self {
        Self::new(MediaKind::Image, uri, display_name)
    }

    /// Copy of this handle with a new display name and edit metadata.
    ///
    /// The id and locator carry over; the audio itself is not transformed.
    pub fn renamed(&self, display_name: impl Into<String>, edit: EditParams) -> Self {
        Self {
            id: self.id,
            uri: self.uri.clone(),
            display_name: display_name.into(),
            kind: self.kind,
            edit: Some(edit),
        }
    }

    /// Identifier.
    pub fn id(&self) -> MediaId {
        self.id
    }

    /// Resource locator.
    pub fn uri(&self) -> &MediaUri {
        &self.uri
    }

    /// Name shown to the user.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Audio or image.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Volume/speed recorded by the last editor save, if any.
    pub fn edit(&self) -> Option<EditParams> {
        self.edit
    }
}
