//! Command-line assembly and shell-safe rendering
//!
//! Tokens are kept as `OsString` so file-system paths and passthrough
//! arguments reach the child byte-for-byte, UTF-8 or not.

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fmt;

use crate::error::{Result, RunError};
use crate::request::InvocationRequest;
use crate::resolve::BaseInvocation;

/// A fully assembled command: the program followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<OsString>,
}

impl CommandLine {
    /// Append the request's arguments to the base invocation.
    ///
    /// Order is fixed: input, output, workers, config (if any), extra
    /// tokens (if any), then passthrough args as supplied.
    pub fn build(base: &BaseInvocation, request: &InvocationRequest) -> Result<Self> {
        let mut tokens: Vec<OsString> = base.tokens().iter().map(OsString::from).collect();
        if tokens.is_empty() {
            return Err(RunError::EmptyCommand);
        }

        tokens.extend([
            OsString::from("--input"),
            request.input.clone().into_os_string(),
            OsString::from("--output"),
            request.output.clone().into_os_string(),
            OsString::from("--workers"),
            OsString::from(&request.workers),
        ]);

        if let Some(config) = request.config_path() {
            tokens.extend([OsString::from("--config"), config.as_os_str().to_owned()]);
        }

        if let Some(extra) = request.extra_args() {
            let extra_tokens =
                shlex::split(extra).ok_or_else(|| RunError::tokenize("--extra", extra))?;
            tokens.extend(extra_tokens.into_iter().map(OsString::from));
        }

        tokens.extend(request.passthrough.iter().cloned());

        Ok(Self { tokens })
    }

    pub fn from_tokens<I, T>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let tokens: Vec<OsString> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(RunError::EmptyCommand);
        }
        Ok(Self { tokens })
    }

    pub fn program(&self) -> &OsStr {
        &self.tokens[0]
    }

    pub fn args(&self) -> &[OsString] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[OsString] {
        &self.tokens
    }

    /// Render for copy-paste into a POSIX shell, quoting each token on its own.
    ///
    /// The bytes are exact: non-UTF-8 tokens survive. Tokens shlex refuses to
    /// quote (interior NUL) are emitted raw; no shell could pass them anyway.
    pub fn render_bytes(&self) -> Vec<u8> {
        let mut rendered = Vec::new();
        for (idx, token) in self.tokens.iter().enumerate() {
            if idx > 0 {
                rendered.push(b' ');
            }
            rendered.extend_from_slice(&quote_token(token));
        }
        rendered
    }

    /// Lossy text form of [`render_bytes`](Self::render_bytes), for logs
    pub fn render(&self) -> String {
        String::from_utf8_lossy(&self.render_bytes()).into_owned()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(unix)]
fn quote_token(token: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;

    let raw = token.as_bytes();
    shlex::bytes::try_quote(raw).unwrap_or(Cow::Borrowed(raw))
}

#[cfg(not(unix))]
fn quote_token(token: &OsStr) -> Cow<'_, [u8]> {
    let text = token.to_string_lossy();
    let quoted = shlex::try_quote(&text)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| text.into_owned());
    Cow::Owned(quoted.into_bytes())
}
