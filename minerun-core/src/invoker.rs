//! Run orchestration: output directory, resolution, echo, launch
//!
//! One `Invoker::run` call is one wrapper run. Only the tool's own exit
//! status is translated (into `RunError::ToolFailed`/`ToolKilled`); every
//! other failure is returned unchanged.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::command::CommandLine;
use crate::error::{Result, RunError};
use crate::launcher::{ExitOutcome, ProcessLauncher, SystemLauncher};
use crate::request::InvocationRequest;
use crate::resolve::{resolve_base, FallbackSpec, Resolver};

/// Prefix for lines the wrapper itself prints
pub const LOG_PREFIX: &str = "[run]";

pub struct Invoker<L> {
    resolver: Resolver,
    fallback: FallbackSpec,
    launcher: L,
}

impl Invoker<SystemLauncher> {
    /// Invoker over the process environment and real child processes
    pub fn from_env() -> Self {
        let resolver = Resolver::from_env();
        let fallback = FallbackSpec::from_env(&resolver);
        Self::new(resolver, fallback, SystemLauncher)
    }
}

impl<L: ProcessLauncher> Invoker<L> {
    pub fn new(resolver: Resolver, fallback: FallbackSpec, launcher: L) -> Self {
        Self {
            resolver,
            fallback,
            launcher,
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Resolve the tool and assemble the full command line
    pub fn prepare(&self, request: &InvocationRequest) -> Result<CommandLine> {
        let base = resolve_base(&request.tool_command, &self.resolver, &self.fallback)?;
        debug!(
            fallback = base.is_fallback(),
            executable = ?base.executable_path(),
            "resolved base invocation"
        );

        let command = CommandLine::build(&base, request)?;
        debug!(%command, "assembled command");
        Ok(command)
    }

    /// Run the tool once for `request`, echoing the command to `out` first.
    ///
    /// The output directory is created before anything else so it exists
    /// even when resolution or the tool fails.
    pub fn run<W: Write>(&self, request: &InvocationRequest, out: &mut W) -> Result<()> {
        ensure_output_dir(&request.output)?;

        let command = self.prepare(request)?;
        write!(out, "{LOG_PREFIX} Executing: ")?;
        out.write_all(&command.render_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;

        let outcome = self.launcher.launch(&command)?;
        debug!(?outcome, "tool finished");

        match outcome {
            ExitOutcome::Success => Ok(()),
            ExitOutcome::Code(code) => Err(RunError::ToolFailed { code }),
            ExitOutcome::Signal(signal) => Err(RunError::ToolKilled { signal }),
        }
    }
}

/// Create `path` and any missing parents; an existing directory is fine
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        info!("creating output directory {}", path.display());
    }
    fs::create_dir_all(path).map_err(|source| RunError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::RecordingLauncher;
    use tempfile::TempDir;

    fn invoker(search: &Path, outcome: ExitOutcome) -> Invoker<RecordingLauncher> {
        let resolver = Resolver::with_search_path(search, search);
        let fallback = FallbackSpec {
            interpreter: "/usr/bin/python3".into(),
            module: "mineru".into(),
        };
        Invoker::new(resolver, fallback, RecordingLauncher::new(outcome))
    }

    #[test]
    fn test_run_creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("a/b/c");
        let inv = invoker(dir.path(), ExitOutcome::Success);

        let mut out = Vec::new();
        inv.run(&InvocationRequest::new("in.pdf", &output), &mut out)
            .unwrap();

        assert!(output.is_dir());
        // second run over an existing directory is fine
        inv.run(&InvocationRequest::new("in.pdf", &output), &mut out)
            .unwrap();
        assert_eq!(inv.launcher().calls().len(), 2);
    }

    #[test]
    fn test_run_echoes_exactly_what_it_launches() {
        let dir = TempDir::new().unwrap();
        let inv = invoker(dir.path(), ExitOutcome::Success);
        let mut req = InvocationRequest::new("scan 1.png", dir.path().join("out"));
        req.passthrough = vec!["--foo".into(), "val".into()];

        let mut out = Vec::new();
        inv.run(&req, &mut out).unwrap();

        let echoed = String::from_utf8(out).unwrap();
        let line = echoed
            .trim_end()
            .strip_prefix("[run] Executing: ")
            .unwrap();
        let calls = inv.launcher().calls();
        let launched: Vec<String> = calls[0]
            .iter()
            .map(|t| t.to_str().unwrap().to_owned())
            .collect();
        assert_eq!(shlex::split(line).unwrap(), launched);
        assert_eq!(&calls[0][..3], ["/usr/bin/python3", "-m", "mineru"]);
        assert_eq!(&calls[0][calls[0].len() - 2..], ["--foo", "val"]);
    }

    #[test]
    fn test_run_translates_tool_failure() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out");
        let inv = invoker(dir.path(), ExitOutcome::Code(2));

        let err = inv
            .run(&InvocationRequest::new("in.pdf", &output), &mut Vec::new())
            .unwrap_err();

        assert!(matches!(err, RunError::ToolFailed { code: 2 }));
        assert_eq!(err.tool_exit_code(), Some(2));
        assert!(output.is_dir());
    }

    #[test]
    fn test_run_translates_signal() {
        let dir = TempDir::new().unwrap();
        let inv = invoker(dir.path(), ExitOutcome::Signal(15));

        let err = inv
            .run(
                &InvocationRequest::new("in.pdf", dir.path().join("out")),
                &mut Vec::new(),
            )
            .unwrap_err();

        assert_eq!(err.tool_exit_code(), Some(143));
    }

    #[test]
    fn test_output_dir_exists_even_if_command_is_bad() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out");
        let inv = invoker(dir.path(), ExitOutcome::Success);
        let mut req = InvocationRequest::new("in.pdf", &output);
        req.extra = Some("'unterminated".into());

        let mut out = Vec::new();
        let err = inv.run(&req, &mut out).unwrap_err();

        assert!(matches!(err, RunError::Tokenize { .. }));
        assert!(output.is_dir());
        assert!(out.is_empty());
        assert!(inv.launcher().calls().is_empty());
    }

    #[test]
    fn test_output_dir_blocked_by_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let err = ensure_output_dir(&blocker.join("out")).unwrap_err();
        assert!(matches!(err, RunError::CreateOutput { .. }));
    }
}
