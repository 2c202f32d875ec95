//! External tool location
//!
//! Finds git, gcloud and the Python interpreter by probing `PATH` and, on
//! Windows, a short list of conventional installation directories.

use camino::Utf8PathBuf;
use std::ffi::OsStr;

use crate::{Error, Result};

/// Description of an external tool and where to look for it
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Logical tool name, used in error messages
    pub name: &'static str,

    /// Candidate executable names on Unix-like systems, in probe order
    unix_candidates: &'static [&'static str],

    /// Candidate executable names on Windows, in probe order
    windows_candidates: &'static [&'static str],

    /// Where to get the tool, shown when location fails
    pub download_url: &'static str,

    /// Conventional install locations, probed on Windows only
    windows_install_paths: Vec<Utf8PathBuf>,
}

impl ToolSpec {
    /// Locate the tool using the process's `PATH`
    pub fn locate(&self) -> Result<Utf8PathBuf> {
        self.locate_in(std::env::var_os("PATH").as_deref())
    }

    /// Locate the tool against an explicit search path
    pub fn locate_in(&self, search_path: Option<&OsStr>) -> Result<Utf8PathBuf> {
        for candidate in self.candidates() {
            let found = match search_path {
                Some(paths) => which::which_in(candidate, Some(paths), "."),
                None => which::which(candidate),
            };
            if let Ok(path) = found {
                if let Ok(path) = Utf8PathBuf::from_path_buf(path) {
                    tracing::debug!(tool = self.name, %path, "Located executable");
                    return Ok(path);
                }
            }
        }

        if cfg!(windows) {
            for path in &self.windows_install_paths {
                if path.exists() {
                    tracing::debug!(tool = self.name, %path, "Located executable");
                    return Ok(path.clone());
                }
            }
        }

        Err(Error::tool(
            format!(
                "Tool '{}' was not found. Install it and/or add it to PATH.",
                self.name
            ),
            format!("Download from: {}", self.download_url),
        ))
    }

    fn candidates(&self) -> &'static [&'static str] {
        if cfg!(windows) {
            self.windows_candidates
        } else {
            self.unix_candidates
        }
    }
}

/// Spec for the git client
pub fn git_spec() -> ToolSpec {
    ToolSpec {
        name: "git",
        unix_candidates: &["git"],
        windows_candidates: &["git.exe", "git"],
        download_url: "https://git-scm.com/downloads",
        windows_install_paths: vec![program_files().join("Git").join("bin").join("git.exe")],
    }
}

/// Spec for the gcloud CLI
pub fn gcloud_spec() -> ToolSpec {
    let sdk_bin = |root: Utf8PathBuf| {
        root.join("Google")
            .join("Cloud SDK")
            .join("google-cloud-sdk")
            .join("bin")
            .join("gcloud.cmd")
    };
    ToolSpec {
        name: "gcloud",
        unix_candidates: &["gcloud"],
        windows_candidates: &["gcloud.cmd", "gcloud.exe", "gcloud"],
        download_url: "https://cloud.google.com/sdk/docs/install",
        windows_install_paths: vec![sdk_bin(program_files()), sdk_bin(local_app_data())],
    }
}

/// Spec for the Python interpreter
pub fn python_spec() -> ToolSpec {
    ToolSpec {
        name: "python",
        unix_candidates: &["python3", "python"],
        windows_candidates: &["python.exe", "python3.exe", "python"],
        download_url: "https://www.python.org/downloads/",
        windows_install_paths: Vec::new(),
    }
}

fn program_files() -> Utf8PathBuf {
    std::env::var("ProgramFiles")
        .map(Utf8PathBuf::from)
        .unwrap_or_else(|_| Utf8PathBuf::from(r"C:\Program Files"))
}

fn local_app_data() -> Utf8PathBuf {
    if let Ok(val) = std::env::var("LOCALAPPDATA") {
        return Utf8PathBuf::from(val);
    }
    dirs::home_dir()
        .and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
        .unwrap_or_else(|| Utf8PathBuf::from(r"C:\"))
        .join("AppData")
        .join("Local")
}
