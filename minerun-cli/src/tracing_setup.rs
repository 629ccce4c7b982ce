//! Tracing setup for the minerun CLI
//!
//! Logs go to stderr so stdout carries only the echoed command and
//! MinerU's own output.
//!
//! Usage:
//!   RUST_LOG=debug minerun ...        # show resolution and exit details
//!   RUST_LOG=minerun_core=info ...    # fine-grained log control

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "warn";

/// Initialize console tracing on stderr
pub fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
