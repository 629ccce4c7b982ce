//! minerun - run MinerU over an input path to an output path
//!
//! Resolves the MinerU CLI (falling back to `python -m mineru`), forwards
//! the wrapper's options plus any unrecognized arguments, echoes the exact
//! command, and exits with MinerU's own status when it fails.

use std::io;
use std::process;

use anyhow::{Context, Result};
use minerun_core::{Invoker, LOG_PREFIX};
use tracing::debug;

mod cli;
mod tracing_setup;

use cli::Cli;

fn main() -> Result<()> {
    // .env never overrides variables already set in the environment
    dotenvy::dotenv().ok();
    tracing_setup::init_tracing().ok();

    let cli = Cli::parse_with_passthrough(std::env::args_os());
    debug!(?cli, "parsed arguments");
    let request = cli.into_request();

    let invoker = Invoker::from_env();
    let result = invoker.run(&request, &mut io::stdout().lock());

    if let Err(err) = result {
        if let Some(code) = err.tool_exit_code() {
            eprintln!("{LOG_PREFIX} {err}");
            process::exit(code);
        }
        return Err(err).context("minerun failed");
    }

    Ok(())
}
