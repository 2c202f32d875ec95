//! Configuration file parsing
//!
//! This module handles parsing of `fnship.toml`. Every setting has a
//! default mirroring the stock deployment, so a missing file yields a
//! fully usable configuration.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "fnship.toml";

/// Main configuration structure for fnship
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source repository settings
    pub repo: RepoConfig,

    /// Cloud function settings
    pub function: FunctionConfig,

    /// Local Python environment settings
    pub python: PythonConfig,

    /// Report polling settings
    pub poll: PollConfig,

    /// External tool path overrides
    pub tools: ToolsConfig,
}

/// Source repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Remote repository to clone the function source from
    pub url: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/mszewczy/moje-narzedzia-ai-1967.git".to_string(),
        }
    }
}

/// Cloud function configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionConfig {
    /// Name of the deployed function
    pub name: String,

    /// Cloud region to deploy into
    pub region: String,

    /// Path of the function source relative to the repository root
    pub source_dir: Utf8PathBuf,

    /// Entry-point file the platform expects inside the source directory
    pub entry_file: String,

    /// Runtime identifier passed to the deploy command
    pub runtime: String,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            name: "pythonver".to_string(),
            region: "europe-central2".to_string(),
            source_dir: Utf8PathBuf::from("backend/pythonver"),
            entry_file: "main.py".to_string(),
            runtime: "python312".to_string(),
        }
    }
}

/// Local Python environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    /// Packages that must be importable before the run proceeds
    pub required_packages: Vec<String>,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            required_packages: vec![
                "google-cloud-secret-manager".to_string(),
                "requests".to_string(),
                "functions-framework".to_string(),
                "beautifulsoup4".to_string(),
            ],
        }
    }
}

/// Report polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Overall budget for the report to become available, in seconds
    pub timeout_secs: u64,

    /// Pause between poll attempts, in seconds
    pub interval_secs: u64,

    /// Per-request HTTP timeout, in seconds
    pub request_timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 180,
            interval_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

impl PollConfig {
    /// Overall polling budget
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pause between poll attempts
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Per-request HTTP timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Explicit paths for external tools, bypassing the locator when set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Python interpreter path
    pub python: Option<Utf8PathBuf>,

    /// Git executable path
    pub git: Option<Utf8PathBuf>,

    /// gcloud executable path
    pub gcloud: Option<Utf8PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// A missing file is not an error and yields the default configuration.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load configuration from a string (for testing)
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
