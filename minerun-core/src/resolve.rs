//! Tool location: search-path lookup and the module-invocation fallback
//!
//! If the configured command is not an executable on the search path, the
//! tool is run as `<interpreter> -m <module>` instead, relying on it being
//! installed as an importable Python package.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, RunError};

/// Interpreter candidates tried on the search path, in order
const INTERPRETER_CANDIDATES: &[&str] = &["python3", "python"];

/// Looks up executables on a fixed search path.
#[derive(Debug, Clone)]
pub struct Resolver {
    search_path: Option<OsString>,
    cwd: PathBuf,
}

impl Resolver {
    /// Resolver over the process `PATH` and current directory
    pub fn from_env() -> Self {
        Self {
            search_path: env::var_os("PATH"),
            cwd: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn with_search_path(search_path: impl Into<OsString>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            search_path: Some(search_path.into()),
            cwd: cwd.into(),
        }
    }

    /// First executable file named `name` on the search path.
    ///
    /// Names containing a path separator are checked directly, relative to
    /// the resolver's working directory.
    pub fn find_executable(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        which::which_in(name, self.search_path.as_ref(), &self.cwd).ok()
    }
}

/// How to run the tool when no standalone executable exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackSpec {
    pub interpreter: String,
    pub module: String,
}

impl FallbackSpec {
    pub const DEFAULT_MODULE: &'static str = "mineru";

    /// Fallback configured from `MINERU_PYTHON` / `MINERU_MODULE`
    pub fn from_env(resolver: &Resolver) -> Self {
        Self::detect(
            resolver,
            env::var("MINERU_PYTHON").ok(),
            env::var("MINERU_MODULE").ok(),
        )
    }

    /// Pick the interpreter and module name.
    ///
    /// Empty overrides count as unset. Without an interpreter override the
    /// first Python found on the search path wins, else bare `python3`.
    pub fn detect(
        resolver: &Resolver,
        interpreter: Option<String>,
        module: Option<String>,
    ) -> Self {
        let interpreter = interpreter
            .filter(|i| !i.is_empty())
            .or_else(|| {
                INTERPRETER_CANDIDATES
                    .iter()
                    .find_map(|name| resolver.find_executable(name))
                    .and_then(|path| path.to_str().map(str::to_owned))
            })
            .unwrap_or_else(|| INTERPRETER_CANDIDATES[0].to_string());

        let module = module
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_MODULE.to_string());

        Self {
            interpreter,
            module,
        }
    }

    pub fn tokens(&self) -> Vec<String> {
        vec![self.interpreter.clone(), "-m".to_string(), self.module.clone()]
    }
}

/// The leading tokens of the assembled command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseInvocation {
    /// The configured command, whose program was found on the search path
    Executable { path: PathBuf, tokens: Vec<String> },
    /// `<interpreter> -m <module>`
    ModuleFallback { tokens: Vec<String> },
}

impl BaseInvocation {
    pub fn tokens(&self) -> &[String] {
        match self {
            Self::Executable { tokens, .. } | Self::ModuleFallback { tokens } => tokens,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::ModuleFallback { .. })
    }

    /// Resolved program path, when a standalone executable was found
    pub fn executable_path(&self) -> Option<&Path> {
        match self {
            Self::Executable { path, .. } => Some(path),
            Self::ModuleFallback { .. } => None,
        }
    }
}

/// Resolve the configured tool command into its base invocation.
///
/// The command string is shell-tokenized and its first token looked up on
/// the search path. The tokens are kept as configured (not replaced by the
/// resolved path) so the echoed command reads the way the user wrote it.
pub fn resolve_base(
    tool_command: &str,
    resolver: &Resolver,
    fallback: &FallbackSpec,
) -> Result<BaseInvocation> {
    let tokens =
        shlex::split(tool_command).ok_or_else(|| RunError::tokenize("--cmd", tool_command))?;
    let program = tokens.first().ok_or(RunError::EmptyCommand)?;

    match resolver.find_executable(program) {
        Some(path) => {
            debug!(program = %program, path = %path.display(), "resolved tool executable");
            Ok(BaseInvocation::Executable { path, tokens })
        }
        None => {
            debug!(
                program = %program,
                interpreter = %fallback.interpreter,
                module = %fallback.module,
                "tool not on search path, using module invocation"
            );
            Ok(BaseInvocation::ModuleFallback {
                tokens: fallback.tokens(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_tool(dir: &Path, name: &str, executable: bool) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = if executable { 0o755 } else { 0o644 };
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        }
        #[cfg(not(unix))]
        let _ = executable;
        path
    }

    fn fallback() -> FallbackSpec {
        FallbackSpec {
            interpreter: "/opt/py/bin/python3".into(),
            module: "mineru".into(),
        }
    }

    #[test]
    fn test_finds_executable_on_search_path() {
        let dir = TempDir::new().unwrap();
        let tool = write_tool(dir.path(), "mineru", true);
        let resolver = Resolver::with_search_path(dir.path(), dir.path());

        assert_eq!(resolver.find_executable("mineru"), Some(tool));
        assert_eq!(resolver.find_executable("missing-tool"), None);
        assert_eq!(resolver.find_executable(""), None);
    }

    #[test]
    fn test_first_search_path_entry_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let winner = write_tool(first.path(), "mineru", true);
        write_tool(second.path(), "mineru", true);

        let joined = env::join_paths([first.path(), second.path()]).unwrap();
        let resolver = Resolver::with_search_path(joined, first.path());

        assert_eq!(resolver.find_executable("mineru"), Some(winner));
    }

    #[cfg(unix)]
    #[test]
    fn test_skips_non_executable_files() {
        let dir = TempDir::new().unwrap();
        write_tool(dir.path(), "mineru", false);
        let resolver = Resolver::with_search_path(dir.path(), dir.path());

        assert_eq!(resolver.find_executable("mineru"), None);
    }

    #[test]
    fn test_resolve_keeps_configured_tokens() {
        let dir = TempDir::new().unwrap();
        let tool = write_tool(dir.path(), "mineru", true);
        let resolver = Resolver::with_search_path(dir.path(), dir.path());

        let base = resolve_base("mineru --backend 'vlm engine'", &resolver, &fallback()).unwrap();
        assert!(!base.is_fallback());
        assert_eq!(base.executable_path(), Some(tool.as_path()));
        assert_eq!(base.tokens(), ["mineru", "--backend", "vlm engine"]);
    }

    #[test]
    fn test_resolve_falls_back_to_module_invocation() {
        let dir = TempDir::new().unwrap();
        let resolver = Resolver::with_search_path(dir.path(), dir.path());

        let base = resolve_base("not-installed", &resolver, &fallback()).unwrap();
        assert!(base.is_fallback());
        assert_eq!(base.tokens(), ["/opt/py/bin/python3", "-m", "mineru"]);
    }

    #[test]
    fn test_resolve_rejects_bad_commands() {
        let dir = TempDir::new().unwrap();
        let resolver = Resolver::with_search_path(dir.path(), dir.path());

        assert!(matches!(
            resolve_base("mineru 'oops", &resolver, &fallback()),
            Err(RunError::Tokenize { field: "--cmd", .. })
        ));
        assert!(matches!(
            resolve_base("   ", &resolver, &fallback()),
            Err(RunError::EmptyCommand)
        ));
    }

    #[test]
    fn test_fallback_detection() {
        let dir = TempDir::new().unwrap();
        let python = write_tool(dir.path(), "python3", true);
        let resolver = Resolver::with_search_path(dir.path(), dir.path());

        let fallback = FallbackSpec::detect(&resolver, None, None);
        assert_eq!(fallback.interpreter, python.to_str().unwrap());
        assert_eq!(fallback.module, "mineru");

        let fallback = FallbackSpec::detect(&resolver, Some("/usr/bin/pypy3".into()), Some(String::new()));
        assert_eq!(fallback.interpreter, "/usr/bin/pypy3");
        assert_eq!(fallback.module, "mineru");

        let empty = TempDir::new().unwrap();
        let bare = Resolver::with_search_path(empty.path(), empty.path());
        let fallback = FallbackSpec::detect(&bare, None, Some("magic_pdf".into()));
        assert_eq!(fallback.tokens(), ["python3", "-m", "magic_pdf"]);
    }
}
