//! Option parsing for the minerun binary
//!
//! The wrapper only owns a handful of flags. Everything else the caller
//! passes belongs to MinerU, so argv is split first: recognized flags go to
//! clap, the rest is kept verbatim (and in order) as passthrough. Tokens stay
//! `OsString` throughout so non-UTF-8 paths reach MinerU unchanged.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use clap::Parser;
use minerun_core::{InvocationRequest, DEFAULT_TOOL_COMMAND, DEFAULT_WORKERS};

/// Wrapper flags that take a value
const VALUE_FLAGS: &[&str] = &[
    "--input",
    "--output",
    "--workers",
    "--cmd",
    "--config",
    "--extra",
];

const HELP_FLAG: &str = "--help";

#[derive(Parser, Debug)]
#[command(
    name = "minerun",
    about = "Run MinerU over an input path to an output path",
    long_about = "Run MinerU over an input path to an output path.\n\n\
                  Unrecognized arguments are forwarded to MinerU unchanged, after all \
                  wrapper-generated arguments.",
    disable_version_flag = true,
    args_override_self = true
)]
pub struct Cli {
    /// Input file or directory (PDFs/images)
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output directory for results (created if missing)
    #[arg(long, value_name = "DIR")]
    pub output: PathBuf,

    /// Worker threads for I/O/preprocessing
    #[arg(long, env = "NUM_WORKERS", default_value = DEFAULT_WORKERS)]
    pub workers: String,

    /// MinerU CLI command
    #[arg(long, value_name = "COMMAND", env = "MINERU_CMD", default_value = DEFAULT_TOOL_COMMAND)]
    pub cmd: String,

    /// Optional MinerU YAML config
    // OsString rather than PathBuf: an empty value means "no config"
    #[arg(long, value_name = "PATH", env = "MINERU_CONFIG")]
    pub config: Option<OsString>,

    /// Additional raw args to append (shell-quoted string)
    #[arg(long, value_name = "ARGS", env = "MINERU_EXTRA")]
    pub extra: Option<String>,

    #[arg(skip)]
    pub passthrough: Vec<OsString>,
}

impl Cli {
    /// Parse wrapper flags from `args`, keeping unrecognized tokens as passthrough.
    ///
    /// Exits with a clap usage error (status 2) on bad wrapper flags.
    pub fn parse_with_passthrough<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        let split = split_known_args(args);
        let mut cli = Self::parse_from(split.known);
        cli.passthrough = split.passthrough;
        cli
    }

    pub fn into_request(self) -> InvocationRequest {
        InvocationRequest {
            input: self.input,
            output: self.output,
            workers: self.workers,
            tool_command: self.cmd,
            config: self.config.map(PathBuf::from),
            extra: self.extra,
            passthrough: self.passthrough,
        }
    }
}

/// argv partitioned into wrapper flags and MinerU passthrough
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SplitArgs {
    /// Program name plus recognized flags, values attached as `--flag=value`
    pub known: Vec<OsString>,
    pub passthrough: Vec<OsString>,
}

/// How one argv token relates to the wrapper's own flags
#[derive(Debug, PartialEq, Eq)]
enum Token {
    /// Bare `--`
    Separator,
    Help,
    /// A value flag, with its value if given inline (`--flag=value`)
    Value {
        flag: &'static str,
        inline: Option<OsString>,
    },
    /// Prefix of more than one wrapper flag
    Ambiguous,
    Passthrough,
}

/// Split argv (program name first) into recognized flags and passthrough.
///
/// Flags may be abbreviated to any unique prefix (`--out` for `--output`).
/// A recognized flag always consumes the next token as its value, even one
/// starting with `-`, so `--extra "--lang en"` works. A bare `--` and
/// everything after it is passthrough. Ambiguous prefixes go to clap, which
/// rejects them.
pub fn split_known_args<I>(args: I) -> SplitArgs
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let mut split = SplitArgs::default();

    if let Some(program) = iter.next() {
        split.known.push(program);
    }

    while let Some(arg) = iter.next() {
        match classify(&arg) {
            Token::Separator => {
                split.passthrough.push(arg);
                split.passthrough.extend(iter.by_ref());
                break;
            }
            Token::Help => split.known.push(HELP_FLAG.into()),
            Token::Value {
                flag,
                inline: Some(value),
            } => split.known.push(flag_with_value(flag, &value)),
            Token::Value { flag, inline: None } => match iter.next() {
                Some(value) => split.known.push(flag_with_value(flag, &value)),
                // let clap report the missing value
                None => split.known.push(flag.into()),
            },
            Token::Ambiguous => split.known.push(arg),
            Token::Passthrough => split.passthrough.push(arg),
        }
    }

    split
}

fn classify(arg: &OsStr) -> Token {
    // Flag names are ASCII, so a lossy view is exact wherever it matters
    let text = arg.to_string_lossy();

    if text == "--" {
        return Token::Separator;
    }
    if text == "-h" {
        return Token::Help;
    }
    if !text.starts_with("--") {
        return Token::Passthrough;
    }

    let (name, has_inline) = match text.split_once('=') {
        Some((name, _)) => (name, true),
        None => (text.as_ref(), false),
    };

    let mut candidates = VALUE_FLAGS
        .iter()
        .chain(std::iter::once(&HELP_FLAG))
        .copied()
        .filter(|flag| flag.starts_with(name));
    let exact = VALUE_FLAGS
        .iter()
        .chain(std::iter::once(&HELP_FLAG))
        .copied()
        .find(|flag| *flag == name);

    let flag = match (exact, candidates.next(), candidates.next()) {
        (Some(flag), _, _) => flag,
        (None, Some(flag), None) => flag,
        (None, Some(_), Some(_)) => return Token::Ambiguous,
        (None, None, _) => return Token::Passthrough,
    };

    if flag == HELP_FLAG {
        return Token::Help;
    }

    Token::Value {
        flag,
        inline: has_inline.then(|| inline_value(arg)),
    }
}

/// Bytes after the first `=` of a `--flag=value` token, preserved exactly
#[cfg(unix)]
fn inline_value(arg: &OsStr) -> OsString {
    use std::os::unix::ffi::OsStrExt;

    let raw = arg.as_bytes();
    let start = raw.iter().position(|b| *b == b'=').map_or(raw.len(), |i| i + 1);
    OsStr::from_bytes(&raw[start..]).to_owned()
}

#[cfg(not(unix))]
fn inline_value(arg: &OsStr) -> OsString {
    let text = arg.to_string_lossy();
    let value = text.split_once('=').map_or("", |(_, v)| v);
    OsString::from(value)
}

fn flag_with_value(flag: &str, value: &OsStr) -> OsString {
    let mut joined = OsString::from(flag);
    joined.push("=");
    joined.push(value);
    joined
}
