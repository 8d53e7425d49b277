use serde::{Deserialize, Serialize};

/// When a submitted draft is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    /// Clear as soon as the post is handed off, whatever the upload reports.
    #[default]
    Optimistic,
    /// Clear only when the upload reports success.
    OnConfirmed,
}
