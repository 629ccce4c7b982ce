use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Tool command used when neither `--cmd` nor `MINERU_CMD` is given
pub const DEFAULT_TOOL_COMMAND: &str = "mineru";

/// Worker count used when neither `--workers` nor `NUM_WORKERS` is given
pub const DEFAULT_WORKERS: &str = "16";

/// Everything needed to assemble one external tool invocation.
///
/// Lives for a single run. Paths are not checked for existence and the
/// worker count is forwarded as-is; both are the tool's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// Input file or directory (PDFs/images)
    pub input: PathBuf,
    /// Output directory, created before the tool runs
    pub output: PathBuf,
    /// Degree of parallelism handed to the tool
    pub workers: String,
    /// Configured tool command, possibly several shell-quoted tokens
    pub tool_command: String,
    /// Optional tool config path
    pub config: Option<PathBuf>,
    /// Optional raw extra arguments, shell-tokenized on use
    pub extra: Option<String>,
    /// Caller tokens the wrapper did not recognize, in original order
    pub passthrough: Vec<OsString>,
}

impl InvocationRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            workers: DEFAULT_WORKERS.to_string(),
            tool_command: DEFAULT_TOOL_COMMAND.to_string(),
            config: None,
            extra: None,
            passthrough: Vec::new(),
        }
    }

    /// Config path, if one was given and is non-empty
    pub fn config_path(&self) -> Option<&Path> {
        self.config
            .as_deref()
            .filter(|c| !c.as_os_str().is_empty())
    }

    /// Raw extra argument string, if one was given and is non-empty
    pub fn extra_args(&self) -> Option<&str> {
        self.extra.as_deref().filter(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = InvocationRequest::new("in.pdf", "out");
        assert_eq!(req.workers, "16");
        assert_eq!(req.tool_command, "mineru");
        assert!(req.passthrough.is_empty());
    }

    #[test]
    fn test_empty_optionals_are_absent() {
        let mut req = InvocationRequest::new("in.pdf", "out");
        req.config = Some(PathBuf::new());
        req.extra = Some(String::new());
        assert_eq!(req.config_path(), None);
        assert_eq!(req.extra_args(), None);

        req.config = Some("mineru.yaml".into());
        req.extra = Some("--lang en".into());
        assert_eq!(req.config_path(), Some(Path::new("mineru.yaml")));
        assert_eq!(req.extra_args(), Some("--lang en"));
    }
}
