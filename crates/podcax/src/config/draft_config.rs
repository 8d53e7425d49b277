use podcax_core::ClearPolicy;

use serde::{Deserialize, Serialize};

/// Post composer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftConfig {
    /// When a submitted draft is cleared.
    #[serde(default)]
    pub clear_policy: ClearPolicy,
}
