//! Command implementations

use camino::Utf8Path;
use fnship_core::Error;
use fnship_core::config::{Config, DEFAULT_CONFIG_FILE};
use miette::Result;

pub mod deploy;
pub mod report;

/// Load the configuration, treating an explicitly named but missing file
/// as an error while a missing default file yields the defaults.
pub(crate) fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => {
            let path = Utf8Path::new(path);
            if !path.exists() {
                return Err(Error::config(
                    format!("Configuration file not found: {}", path),
                    "Pass --config with an existing file, or omit it to use the defaults",
                )
                .into());
            }
            Ok(Config::load(path)?)
        }
        None => Ok(Config::load(Utf8Path::new(DEFAULT_CONFIG_FILE))?),
    }
}
