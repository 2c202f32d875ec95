//! Error types for fnship

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for fnship operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fnship
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A required external tool could not be located
    #[error("Tool error: {message}")]
    #[diagnostic(help("{help}"))]
    Tool { message: String, help: String },

    /// An external command exited with a non-zero status
    #[error("Command error: {message}")]
    #[diagnostic(help("{help}"))]
    Command { message: String, help: String },

    /// An expected file or directory was absent before a step could proceed
    #[error("Precondition error: {message}")]
    #[diagnostic(help("{help}"))]
    Precondition { message: String, help: String },

    /// The deployed function's URL could not be resolved or was malformed
    #[error("URL resolution error: {message}")]
    #[diagnostic(help("{help}"))]
    Resolve { message: String, help: String },

    /// The polling budget was exhausted before the endpoint became ready
    #[error("Timeout error: {message}")]
    #[diagnostic(help("{help}"))]
    Timeout { message: String, help: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    #[diagnostic(help("{help}"))]
    Config { message: String, help: String },

    /// Deploy state error
    #[error("State error: {message}")]
    #[diagnostic(help("{help}"))]
    State { message: String, help: String },

    /// Report handling error
    #[error("Report error: {message}")]
    #[diagnostic(help("{help}"))]
    Report { message: String, help: String },
}

impl Error {
    /// Create a tool-not-found error
    pub fn tool(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Tool {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a command execution error
    pub fn command(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a precondition error
    pub fn precondition(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a URL resolution error
    pub fn resolve(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Resolve {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a deploy state error
    pub fn state(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a report handling error
    pub fn report(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
            help: help.into(),
        }
    }
}
