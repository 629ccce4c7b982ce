//! Core of the minerun wrapper: turn an invocation request into one MinerU
//! child process and mirror how it ended.
//!
//! - [`request`] — the per-run request model and its defaults
//! - [`resolve`] — search-path lookup and the `python -m mineru` fallback
//! - [`command`] — argument assembly and shell-quoted rendering
//! - [`launcher`] — the process launching seam
//! - [`invoker`] — the run itself (output dir, echo, launch, exit mapping)

pub mod command;
pub mod error;
pub mod invoker;
pub mod launcher;
pub mod request;
pub mod resolve;

pub use command::CommandLine;
pub use error::{Result, RunError};
pub use invoker::{ensure_output_dir, Invoker, LOG_PREFIX};
pub use launcher::{ExitOutcome, ProcessLauncher, RecordingLauncher, SystemLauncher};
pub use request::{InvocationRequest, DEFAULT_TOOL_COMMAND, DEFAULT_WORKERS};
pub use resolve::{resolve_base, BaseInvocation, FallbackSpec, Resolver};
