//! External command execution
//!
//! All external tools (git, pip, gcloud, the browser opener) are invoked
//! through the [`CommandRunner`] trait so tests can substitute a recording
//! fake instead of spawning real processes.

use camino::Utf8Path;
use std::process::{Command, Stdio};

use crate::{Error, Result};

/// Capability interface for running external commands.
///
/// `argv[0]` is the program, the rest are its arguments. Both operations
/// block until the process exits and treat a non-zero status as an error.
pub trait CommandRunner {
    /// Run a command with stdout and stderr suppressed.
    fn run(&self, argv: &[String], cwd: Option<&Utf8Path>) -> Result<()>;

    /// Run a command and capture its stdout (stderr suppressed).
    fn output(&self, argv: &[String], cwd: Option<&Utf8Path>) -> Result<String>;
}

/// Production runner that spawns real processes
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String], cwd: Option<&Utf8Path>) -> Result<()> {
        let mut cmd = prepare(argv, cwd)?;
        cmd.stdout(Stdio::null()).stderr(Stdio::null());

        let status = cmd.status()?;
        if !status.success() {
            return Err(exit_error(argv, status.code()));
        }

        Ok(())
    }

    fn output(&self, argv: &[String], cwd: Option<&Utf8Path>) -> Result<String> {
        let mut cmd = prepare(argv, cwd)?;
        cmd.stdout(Stdio::piped()).stderr(Stdio::null());

        let output = cmd.output()?;
        if !output.status.success() {
            return Err(exit_error(argv, output.status.code()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn prepare(argv: &[String], cwd: Option<&Utf8Path>) -> Result<Command> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        Error::command(
            "Attempted to run an empty command line".to_string(),
            "This is a bug in fnship",
        )
    })?;

    tracing::info!("Running: {}", format_command_line(argv));

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    Ok(cmd)
}

fn exit_error(argv: &[String], code: Option<i32>) -> Error {
    let program = argv.first().map(String::as_str).unwrap_or("<none>");
    Error::command(
        format!("'{}' failed with exit code: {:?}", program, code),
        "Re-run with --verbose or RUST_LOG=debug for the full command line",
    )
}

/// Render an argument vector for logging, quoting arguments that contain
/// whitespace.
pub fn format_command_line(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| {
            if arg.chars().any(char::is_whitespace) {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build an owned argument vector from string slices
pub fn build_argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted runner shared by the unit tests

    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Records every invocation; fails commands whose joined argv contains
    /// a configured pattern, and answers `output` calls from a queue.
    #[derive(Default)]
    pub(crate) struct ScriptedRunner {
        pub calls: RefCell<Vec<Vec<String>>>,
        pub fail_patterns: Vec<String>,
        pub outputs: RefCell<VecDeque<String>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(patterns: &[&str]) -> Self {
            Self {
                fail_patterns: patterns.iter().map(|p| p.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn with_outputs(outputs: &[&str]) -> Self {
            Self {
                outputs: RefCell::new(outputs.iter().map(|o| o.to_string()).collect()),
                ..Self::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }

        fn check(&self, argv: &[String]) -> Result<()> {
            let line = argv.join(" ");
            if self.fail_patterns.iter().any(|p| line.contains(p.as_str())) {
                return Err(Error::command(
                    format!("'{}' failed with exit code: Some(1)", argv[0]),
                    "scripted failure",
                ));
            }
            Ok(())
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, argv: &[String], _cwd: Option<&Utf8Path>) -> Result<()> {
            self.calls.borrow_mut().push(argv.to_vec());
            self.check(argv)
        }

        fn output(&self, argv: &[String], _cwd: Option<&Utf8Path>) -> Result<String> {
            self.calls.borrow_mut().push(argv.to_vec());
            self.check(argv)?;
            Ok(self.outputs.borrow_mut().pop_front().unwrap_or_default())
        }
    }
}
