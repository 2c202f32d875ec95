//! Local Python dependency management
//!
//! Verifies that the required packages are importable in the local
//! interpreter, installs the missing ones, and brings the cloned source's
//! manifest dependencies in via pip.

use camino::Utf8Path;

use crate::process::{CommandRunner, build_argv};
use crate::{Error, Result};

/// Dependency manifest file expected inside the function source directory
pub const MANIFEST_FILE: &str = "requirements.txt";

/// Ensure every required package is importable, installing missing ones.
///
/// The module name is the package name with hyphens replaced by
/// underscores. Import is not re-verified after an install; a failed
/// install aborts the run.
pub fn ensure_packages(
    runner: &dyn CommandRunner,
    python: &Utf8Path,
    packages: &[String],
) -> Result<()> {
    tracing::info!("Verifying required Python packages");

    for package in packages {
        let module = package.replace('-', "_");
        let probe = build_argv(&[python.as_str(), "-c", &format!("import {}", module)]);

        match runner.run(&probe, None) {
            Ok(()) => tracing::info!("Package '{}' is already installed", package),
            Err(Error::Command { .. }) => install_package(runner, python, package)?,
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

/// Install a single package via pip
pub fn install_package(
    runner: &dyn CommandRunner,
    python: &Utf8Path,
    package: &str,
) -> Result<()> {
    tracing::info!("Installing missing package: {}...", package);
    runner.run(
        &build_argv(&[python.as_str(), "-m", "pip", "install", package]),
        None,
    )
}

/// Upgrade pip, then install the manifest dependencies of the cloned
/// source if a manifest exists. A missing manifest is a logged skip.
pub fn update_local_libs(
    runner: &dyn CommandRunner,
    python: &Utf8Path,
    source_dir: &Utf8Path,
) -> Result<()> {
    tracing::info!("Updating local libraries");
    runner.run(
        &build_argv(&[python.as_str(), "-m", "pip", "install", "--upgrade", "pip"]),
        None,
    )?;

    let manifest = source_dir.join(MANIFEST_FILE);
    if manifest.exists() {
        tracing::info!("Installing dependencies from {}", manifest);
        runner.run(
            &build_argv(&[python.as_str(), "-m", "pip", "install", "-r", manifest.as_str()]),
            None,
        )?;
    } else {
        tracing::warn!(
            "No {} found in {}. Skipping dependency install.",
            MANIFEST_FILE,
            source_dir
        );
    }

    Ok(())
}
