//! Repository cloning
//!
//! Produces a clean checkout of the configured repository: any
//! pre-existing directory at the target path is removed first so stale
//! content never survives into a run.

use camino::Utf8Path;

use crate::Result;
use crate::process::{CommandRunner, build_argv};

/// Clone `url` into `target`, removing `target` first if it exists
pub fn clone_repo(
    runner: &dyn CommandRunner,
    git: &Utf8Path,
    url: &str,
    target: &Utf8Path,
) -> Result<()> {
    if target.exists() {
        tracing::info!("Removing existing directory: {}", target);
        std::fs::remove_dir_all(target)?;
    }

    tracing::info!("Cloning repository from {} into {}", url, target);
    runner.run(
        &build_argv(&[git.as_str(), "clone", url, target.as_str()]),
        None,
    )
}
