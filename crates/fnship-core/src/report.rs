//! Report saving and viewing
//!
//! Writes the retrieved HTML to a kept temporary file and opens it in the
//! default browser via the platform opener. The file deliberately
//! outlives the process so the browser can read it.

use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

use crate::process::{CommandRunner, build_argv};
use crate::{Error, Result};

/// Write the HTML report to a new temporary `.html` file that is not
/// deleted on drop, returning its path.
pub fn save_report(html: &str) -> Result<Utf8PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix("fnship-report-")
        .suffix(".html")
        .tempfile()?;
    file.write_all(html.as_bytes())?;

    let path = file.into_temp_path().keep().map_err(|e| {
        Error::report(
            format!("Could not keep the report file: {}", e),
            "Check the permissions of the system temporary directory",
        )
    })?;

    Utf8PathBuf::from_path_buf(path).map_err(|path| {
        Error::report(
            format!("Report path is not valid UTF-8: {:?}", path),
            "Set TMPDIR to a directory with a UTF-8 path",
        )
    })
}

/// Open the saved report in the user's default browser
pub fn open_in_browser(runner: &dyn CommandRunner, path: &Utf8Path) -> Result<()> {
    tracing::info!("Opening {} in the default browser", path);
    runner.run(&opener_argv(path), None)
}

#[cfg(target_os = "macos")]
fn opener_argv(path: &Utf8Path) -> Vec<String> {
    build_argv(&["open", path.as_str()])
}

#[cfg(windows)]
fn opener_argv(path: &Utf8Path) -> Vec<String> {
    build_argv(&["cmd", "/C", "start", "", path.as_str()])
}

#[cfg(not(any(target_os = "macos", windows)))]
fn opener_argv(path: &Utf8Path) -> Vec<String> {
    build_argv(&["xdg-open", path.as_str()])
}
