//! One-shot user notices printed on stdout.

use crate::AppError;

use podcax_core::{IncompleteDraft, MediaError, PreviewState, format_millis};

/// A titled message shown once to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Short heading.
    pub title: String,
    /// Message body.
    pub body: String,
}

impl Notice {
    /// Build a notice.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Print to stdout.
    pub fn show(&self) {
        println!("[{}] {}", self.title, self.body);
    }
}

impl From<&MediaError> for Notice {
    fn from(error: &MediaError) -> Self {
        let (title, body) = error.user_notice();
        Notice::new(title, body)
    }
}

impl From<&IncompleteDraft> for Notice {
    fn from(incomplete: &IncompleteDraft) -> Self {
        Notice::new(IncompleteDraft::TITLE, incomplete.message())
    }
}

impl From<&AppError> for Notice {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::Media { source, .. } => Notice::from(source),
            AppError::InvalidCommand { input, reason, .. } => {
                Notice::new("Unknown command", format!("{}: {} (try `help`)", input, reason))
            }
            other => Notice::new("Error", other.to_string()),
        }
    }
}

/// `name  0:12 / 1:30  playing`
pub fn preview_line(preview: &PreviewState) -> String {
    let name = preview.display_name.as_deref().unwrap_or("(no audio)");
    let position = i64::try_from(preview.position_millis).unwrap_or(i64::MAX);
    let duration = i64::try_from(preview.duration_millis).unwrap_or(i64::MAX);
    format!(
        "{}  {} / {}  {}",
        name,
        format_millis(position),
        format_millis(duration),
        if preview.is_playing {
            "playing"
        } else {
            "paused"
        }
    )
}
