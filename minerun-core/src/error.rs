//! Structured error types for minerun-core.
//!
//! The binary (minerun-cli) wraps these in `anyhow` at the top level and
//! only translates the tool-exit variants into process exit codes.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for a single wrapper run
#[derive(Error, Debug)]
pub enum RunError {
    /// Writing the echoed command to stdout failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// A free-form argument string could not be shell-tokenized
    #[error("Cannot tokenize {field} value {value:?}: unbalanced quotes or trailing escape")]
    Tokenize { field: &'static str, value: String },

    /// The configured tool command tokenized to nothing
    #[error("Tool command is empty")]
    EmptyCommand,

    /// The output directory tree could not be created
    #[error("Failed to create output directory {path:?}: {source}")]
    CreateOutput { path: PathBuf, source: io::Error },

    /// The assembled command could not be started
    #[error("Failed to launch {program}: {source}")]
    Launch { program: String, source: io::Error },

    /// The external tool ran and exited non-zero
    #[error("MinerU exited with {code}")]
    ToolFailed { code: i32 },

    /// The external tool was terminated by a signal
    #[error("MinerU terminated by signal {signal}")]
    ToolKilled { signal: i32 },
}

/// Result type alias for minerun-core operations
pub type Result<T> = std::result::Result<T, RunError>;

impl RunError {
    /// Create a tokenize error for the named option
    pub fn tokenize(field: &'static str, value: impl Into<String>) -> Self {
        Self::Tokenize {
            field,
            value: value.into(),
        }
    }

    /// Create a launch error for the given program
    pub fn launch(program: impl Into<String>, source: io::Error) -> Self {
        Self::Launch {
            program: program.into(),
            source,
        }
    }

    /// Exit code the wrapper should mirror, if this error came from the tool itself.
    ///
    /// Signal terminations map to `128 + signal`, matching POSIX shells.
    pub fn tool_exit_code(&self) -> Option<i32> {
        match self {
            Self::ToolFailed { code } => Some(*code),
            Self::ToolKilled { signal } => Some(128 + signal),
            _ => None,
        }
    }
}
