//! Last-deploy record
//!
//! After each successful deployment the function name, region and URL are
//! written to a small JSON file so `fnship report` can re-fetch the
//! diagnostic report without touching gcloud.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Record of the most recent successful deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRecord {
    /// Timestamp of the deployment
    pub timestamp: DateTime<Utc>,
    /// Deployed function name
    pub function: String,
    /// Cloud region
    pub region: String,
    /// Resolved public URL
    pub url: String,
}

impl DeployRecord {
    /// Create a record stamped with the current time
    pub fn new(
        function: impl Into<String>,
        region: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            function: function.into(),
            region: region.into(),
            url: url.into(),
        }
    }

    /// Load a record from a file
    pub fn load(path: &Utf8Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let record: Self = serde_json::from_str(&content).map_err(|e| {
            Error::state(
                format!("Failed to parse the deploy record: {}", e),
                "The state file may be corrupted. Try deleting it.",
            )
        })?;

        Ok(Some(record))
    }

    /// Save the record to a file
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| {
            Error::state(
                format!("Failed to serialize the deploy record: {}", e),
                "This is likely a bug in fnship",
            )
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Default location of the deploy record, under the user's home directory
pub fn default_state_path() -> Option<Utf8PathBuf> {
    let home = dirs::home_dir().and_then(|p| Utf8PathBuf::from_path_buf(p).ok())?;
    Some(home.join(".fnship").join("last_deploy.json"))
}
