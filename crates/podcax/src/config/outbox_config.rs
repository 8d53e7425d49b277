use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where submitted posts are spooled for upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxConfig {
    /// Directory receiving one manifest per post.
    pub dir: PathBuf,
}
