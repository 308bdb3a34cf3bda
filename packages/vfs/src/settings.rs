//! Spill storage settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where and how a mount's spill cache creates temporary storage.
///
/// Deserializes from JSON with every field optional:
///
/// ```json
/// {"temp_prefix": "build-", "temp_root": "/var/tmp"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpillSettings {
    /// Prefix of the temporary directory created on the first spill.
    pub temp_prefix: String,
    /// Parent directory for spill storage; the system temp dir when unset.
    pub temp_root: Option<PathBuf>,
}

impl Default for SpillSettings {
    fn default() -> Self {
        Self {
            temp_prefix: "shrinkfs-".to_string(),
            temp_root: None,
        }
    }
}

impl SpillSettings {
    /// Parse settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
