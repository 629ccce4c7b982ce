//! Process launcher trait and implementations
//!
//! - `SystemLauncher` runs the command with inherited stdio and waits
//! - `RecordingLauncher` records commands and returns a canned outcome (tests)

use std::ffi::OsString;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Mutex;

use crate::command::CommandLine;
use crate::error::{Result, RunError};

/// How the child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    /// Non-zero exit code
    Code(i32),
    /// Killed by a signal (Unix only)
    Signal(i32),
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            return Self::Success;
        }
        if let Some(code) = status.code() {
            return Self::Code(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signal(signal);
            }
        }

        Self::Code(1)
    }
}

/// Runs an assembled command to completion (testable)
pub trait ProcessLauncher {
    fn launch(&self, command: &CommandLine) -> Result<ExitOutcome>;
}

/// Real launcher using `std::process`, blocking until the child exits
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, command: &CommandLine) -> Result<ExitOutcome> {
        let status = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| RunError::launch(command.program().to_string_lossy(), e))?;

        Ok(status.into())
    }
}

/// Launcher that records every command instead of running it
#[derive(Debug)]
pub struct RecordingLauncher {
    outcome: ExitOutcome,
    calls: Mutex<Vec<Vec<OsString>>>,
}

impl Default for RecordingLauncher {
    fn default() -> Self {
        Self::new(ExitOutcome::Success)
    }
}

impl RecordingLauncher {
    pub fn new(outcome: ExitOutcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Token lists of every launched command, oldest first
    pub fn calls(&self) -> Vec<Vec<OsString>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&self, command: &CommandLine) -> Result<ExitOutcome> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(command.tokens().to_vec());
        Ok(self.outcome)
    }
}
